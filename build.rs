use std::env;
use std::path::Path;

// Record the checkout this crate was built from; `config::resolve_items_path`
// looks for `public/items.json` under it when no env override is set.
fn main() {
    println!("cargo:rerun-if-env-changed=BIS_ROOT_HINT");
    println!("cargo:rerun-if-changed=build.rs");

    let root = match env::var("BIS_ROOT_HINT") {
        Ok(hint) if !hint.trim().is_empty() => hint,
        _ => match env::var("CARGO_MANIFEST_DIR") {
            Ok(dir) => dir,
            Err(_) => return,
        },
    };
    let root = Path::new(&root);
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    println!("cargo:rustc-env=BIS_ROOT_HINT={}", root.display());
}
