pub mod bulk;
pub mod neuron;
