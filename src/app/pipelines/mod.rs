pub mod plot_pipeline;
