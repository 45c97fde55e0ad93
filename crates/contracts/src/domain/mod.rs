pub mod a001_remnant;
