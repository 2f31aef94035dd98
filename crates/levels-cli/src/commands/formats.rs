//! Formats command.
//!
//! Lists the pixel layouts the levels filter negotiates.

use anyhow::Result;
use levels_core::{Channel, PixelLayout};
use levels_ops::LevelsFilter;

/// One table row per layout.
pub fn describe(layout: PixelLayout) -> String {
    let desc = layout.descriptor();
    let offsets: Vec<String> = Channel::ALL
        .iter()
        .map(|&c| match desc.offset(c) {
            Some(off) => format!("{}={off}", c.letter()),
            None => format!("{}=-", c.letter()),
        })
        .collect();
    format!(
        "{:<8} {:<7} {:>4}  {}",
        layout.name(),
        desc.depth().to_string(),
        desc.step_bytes(),
        offsets.join(" ")
    )
}

/// Run the formats command.
pub fn run() -> Result<()> {
    println!("{:<8} {:<7} {:>4}  OFFSETS", "LAYOUT", "DEPTH", "BPP");
    for &layout in LevelsFilter::supported_layouts() {
        println!("{}", describe(layout));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let line = describe(PixelLayout::Bgra64);
        assert!(line.starts_with("bgra64"));
        assert!(line.contains("16-bit"));
        assert!(line.contains("r=2 g=1 b=0 a=3"));

        let line = describe(PixelLayout::Xrgb);
        assert!(line.contains("r=1 g=2 b=3 a=-"));
    }
}
