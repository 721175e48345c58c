use {
    crate::sentinel::Load,
    crossterm::{QueueableCommand, cursor, terminal},
    std::io::{self, Write},
};

/// clears the screen, and writes one `<core>: <percent>` line per core.
pub fn render(writer: &mut impl Write, loads: &[Load]) -> io::Result<()> {
    writer
        .queue(cursor::MoveTo(0, 0))?
        .queue(terminal::Clear(terminal::ClearType::FromCursorDown))?;

    for (core, load) in loads.iter().enumerate() {
        writeln!(writer, "{core}: {}", load.percentage())?;
    }

    writer.flush()
}
