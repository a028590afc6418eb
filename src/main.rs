fn main() {
    bracket_console::run();
}
