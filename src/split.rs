//! Train/validation split of processed image IDs.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};

/// Manifest name for the training IDs.
pub const TRAIN_SET: &str = "train.txt";
/// Manifest name for the validation IDs.
pub const VAL_SET: &str = "val.txt";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<String>,
    pub val: Vec<String>,
}

/// Moves `round(len * val_fraction)` randomly chosen IDs into `val`.
///
/// Both halves keep the input order. With a seed the split is
/// reproducible; a fraction of zero puts everything into `train`.
pub fn split_ids(ids: &[String], val_fraction: f64, seed: Option<u64>) -> Split {
    let val_count = ((ids.len() as f64) * val_fraction).round() as usize;
    if val_count == 0 {
        return Split {
            train: ids.to_vec(),
            val: Vec::new(),
        };
    }

    let mut shuffled: Vec<&String> = ids.iter().collect();
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        shuffled.shuffle(&mut rng);
    } else {
        let mut rng = rand::rng();
        shuffled.shuffle(&mut rng);
    }

    let val_ids: HashSet<&String> = shuffled.into_iter().take(val_count).collect();
    let (val, train): (Vec<String>, Vec<String>) =
        ids.iter().cloned().partition(|id| val_ids.contains(id));

    Split { train, val }
}
