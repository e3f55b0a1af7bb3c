fn main() {
    trajectory_pipeline::cli::run();
}
