mod backpressure;
mod channel;
mod config;
