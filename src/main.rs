//! cvo - version-gated configuration migration.

fn main() {
    std::process::exit(carryover::cli::run());
}
