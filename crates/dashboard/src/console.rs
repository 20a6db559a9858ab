use enginedash_client::{PowerReadout, TelemetryView};
use enginedash_core::{Control, Direction, Rotation, ENGINE_COUNT};

/// Engine power slots printed as one line per completed snapshot.
#[derive(Default)]
pub struct ConsoleView {
    slots: [String; ENGINE_COUNT],
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> String {
        let cells: Vec<String> = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, v)| format!("E{} {:>7}", i + 1, if v.is_empty() { "-" } else { v.as_str() }))
            .collect();
        cells.join("  ")
    }
}

impl TelemetryView for ConsoleView {
    fn render_engine(&mut self, slot: usize, reading: &str) {
        if let Some(cell) = self.slots.get_mut(slot) {
            *cell = reading.to_string();
        }
        if slot + 1 == ENGINE_COUNT {
            println!("{}", self.line());
        }
    }

    fn render_error(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

pub struct ConsoleReadout;

impl PowerReadout for ConsoleReadout {
    fn render_power(&mut self, text: &str) {
        println!("power {}", text);
    }
}

#[derive(Debug, PartialEq)]
pub enum Input {
    Control(Control),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  power <0-100>       move the power slider
  forward | backward | left | right
  rotate-left | rotate-right
  stay                re-send the current power
  button <name>       send a raw button name (socket transport)
  help | quit";

pub fn parse_input(line: &str) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let control = match head.to_ascii_lowercase().as_str() {
        "power" | "slider" | "p" => {
            let raw = arg.ok_or("power needs a percentage")?;
            let percent = raw.parse::<f64>().map_err(|_| format!("not a number: {}", raw))?;
            Control::Slider(percent)
        }
        "forward" | "f" => Control::Direction(Direction::Forward),
        "backward" | "back" | "b" => Control::Direction(Direction::Backward),
        "left" | "l" => Control::Direction(Direction::Left),
        "right" | "r" => Control::Direction(Direction::Right),
        "rotate-left" | "leftrotation" | "rl" => Control::Rotation(Rotation::Left),
        "rotate-right" | "rightrotation" | "rr" => Control::Rotation(Rotation::Right),
        "stay" | "dot" | "." => Control::Stay,
        "button" => Control::Button(arg.ok_or("button needs a name")?.to_string()),
        "help" | "?" => return Ok(Some(Input::Help)),
        "quit" | "exit" | "q" => return Ok(Some(Input::Quit)),
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(Some(Input::Control(control)))
}
