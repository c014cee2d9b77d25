//! Lists supported buffer formats.

use anyhow::Result;
use pixtwin_core::registry;

pub fn run(verbose: u8) -> Result<()> {
    for label in registry::supported_labels() {
        let Some(format) = registry::format_from_label(label) else {
            continue;
        };
        match registry::to_view_layout(format) {
            Some(mat_type) if verbose > 0 => {
                println!(
                    "{label:<18} {:<12} view {mat_type} (code {})",
                    format.to_string(),
                    mat_type.code()
                )
            }
            _ => println!("{label}"),
        }
    }
    Ok(())
}
