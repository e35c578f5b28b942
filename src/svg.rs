//! Visual dump of an [`crate::AtlasAllocator`] as SVG, for inspecting a
//! packing by eye. Gated behind the `svg` feature.

use crate::allocator::{AtlasAllocator, BlockView};
use crate::geometry::Rectangle;
use svg_fmt::*;

/// Which extra layers to draw on top of the plain block rectangles.
///
/// All fields default to the table in the crate documentation:
/// `waste` and `names` on, `coords`, `stroke` and `unused` off.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SvgOptions {
    /// Shade the unused portion of in-use blocks (`shelf.height - block.height`).
    pub waste: bool,
    /// Print each in-use block's name, when it has one.
    pub names: bool,
    /// Print each block's offset and size as text.
    pub coords: bool,
    /// Draw a stroke around every block, including free ones.
    pub stroke: bool,
    /// Fill free blocks, rather than leaving them the background color.
    pub unused: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        SvgOptions {
            waste: true,
            names: true,
            coords: false,
            stroke: false,
            unused: false,
        }
    }
}

/// Dump a standalone SVG document representing `atlas`.
pub fn dump_svg(
    atlas: &AtlasAllocator,
    options: &SvgOptions,
    output: &mut dyn std::io::Write,
) -> std::io::Result<()> {
    let size = atlas.size();

    writeln!(
        output,
        "{}",
        BeginSvg {
            w: size.width as f32,
            h: size.height as f32,
        }
    )?;

    dump_into_svg(atlas, options, None, output)?;

    writeln!(output, "{}", EndSvg)
}

/// Dump the same content as [`dump_svg`] without the `<svg>` wrapper, so
/// it can be embedded into a larger document.
///
/// If `rect` is provided, the atlas is scaled and translated to fit it.
pub fn dump_into_svg(
    atlas: &AtlasAllocator,
    options: &SvgOptions,
    rect: Option<&Rectangle>,
    output: &mut dyn std::io::Write,
) -> std::io::Result<()> {
    let size = atlas.size();

    let (sx, sy, tx, ty) = if let Some(rect) = rect {
        (
            rect.width() as f32 / size.width as f32,
            rect.height() as f32 / size.height as f32,
            rect.min.x as f32,
            rect.min.y as f32,
        )
    } else {
        (1.0, 1.0, 0.0, 0.0)
    };

    writeln!(
        output,
        "    {}",
        rectangle(tx, ty, size.width as f32 * sx, size.height as f32 * sy)
            .fill(rgb(40, 40, 40))
            .stroke(Stroke::Color(black(), 1.0))
    )?;

    for block in atlas.enumerate() {
        draw_block(&block, options, sx, sy, tx, ty, output)?;
    }

    Ok(())
}

fn draw_block(
    block: &BlockView<'_>,
    options: &SvgOptions,
    sx: f32,
    sy: f32,
    tx: f32,
    ty: f32,
    output: &mut dyn std::io::Write,
) -> std::io::Result<()> {
    let x = block.block_offset as f32 * sx + tx;
    let y = block.shelf_y as f32 * sy + ty;
    let w = block.block_size.width as f32 * sx;
    let h = block.block_size.height as f32 * sy;

    if block.in_use {
        let fill = rectangle(x, y, w, h).fill(rgb(70, 70, 180));
        if options.stroke {
            writeln!(output, "    {}", fill.stroke(Stroke::Color(black(), 1.0)))?;
        } else {
            writeln!(output, "    {}", fill)?;
        }

        if options.waste && block.block_size.height < block.shelf_height {
            let waste_y = y + block.block_size.height as f32 * sy;
            let waste_h = (block.shelf_height - block.block_size.height) as f32 * sy;
            writeln!(
                output,
                "    {}",
                rectangle(x, waste_y, w, waste_h).fill(rgb(180, 70, 70))
            )?;
        }

        if options.names {
            if let Some(name) = block.name {
                writeln!(output, "    {}", text(x + 2.0, y + 12.0, name).color(white()))?;
            }
        }
    } else if options.unused {
        let fill = rectangle(x, y, w, h).fill(rgb(50, 50, 50));
        if options.stroke {
            writeln!(output, "    {}", fill.stroke(Stroke::Color(black(), 1.0)))?;
        } else {
            writeln!(output, "    {}", fill)?;
        }
    } else if options.stroke {
        writeln!(
            output,
            "    {}",
            rectangle(x, y, w, h)
                .fill(Fill::None)
                .stroke(Stroke::Color(black(), 1.0))
        )?;
    }

    if options.coords {
        writeln!(
            output,
            "    {}",
            text(
                x + 2.0,
                y + h - 2.0,
                format!(
                    "{},{} {}x{}",
                    block.block_offset, block.shelf_y, block.block_size.width, block.block_size.height
                )
            )
            .color(white())
        )?;
    }

    Ok(())
}
