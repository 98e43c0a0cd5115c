mod euclideandistance;

pub use euclideandistance::{distance, squared_distance};
