fn main() {
    wise_stereo::cli::run();
}
