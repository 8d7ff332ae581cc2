mod degradation;
mod fixed_window;
