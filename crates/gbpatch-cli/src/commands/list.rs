//! List command implementation.

use gbpatch_core::PatchCatalog;

/// Render the numbered patch list shown by `--list` and interactive mode
pub fn format_patch_list(catalog: &PatchCatalog) -> String {
    if catalog.is_empty() {
        return "No patches found in the patches directory.".to_string();
    }

    let mut out = format!("\nAvailable patches ({}):\n", catalog.len());
    out.push_str(&"=".repeat(40));
    out.push('\n');
    for (i, name) in catalog.names().enumerate() {
        out.push_str(&format!("{:2}. {}\n", i + 1, name));
    }
    out
}

/// Run the list command
pub fn run(catalog: &PatchCatalog) {
    println!("{}", format_patch_list(catalog));
}
