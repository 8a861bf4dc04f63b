//! Build script that rebuilds the crate when the review-row migrations change.
//!
//! `embed_migrations!` reads the migration files at compile time, and Cargo
//! does not track those files on its own.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
