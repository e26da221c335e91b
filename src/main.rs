fn main() {
    check_clang_tidy::cli::run();
}
