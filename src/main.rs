// This binary crate is intentionally minimal.
// All engine logic lives in the library (src/lib.rs and its modules).
// Run demos with:
//   cargo run --example xor
fn main() {
    println!("manta-nn: a minimal feedforward neural-network engine in Rust.");
    println!("Run `cargo run --example xor` to see the XOR demo.");
}
