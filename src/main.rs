use sandpile_group::{png, recurrence, Cell, Options, Registry, Sandpile};

use std::{
	io::{self, BufRead},
	path::PathBuf,
};

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Arithmetic in the sandpile group of a rectangular grid.
#[derive(Parser, Debug)]
#[command(
	name = "sandpile",
	version,
	after_help = "Example: sandpile 3 ascii+order add all-9 id"
)]
struct Cli {
	/// Grid size, as '100' or '60x50' (rows x columns)
	#[arg(value_parser = parse_size)]
	size: Size,
	/// '+'-separated 'ascii', 'png', 'topplings', 'order' and/or 'trace', or sole 'eq' or 'recurrent'
	output: String,
	/// Targets in prefix notation: 'id', 'read', 'all-N', 'inverse', 'dup', 'add'
	#[arg(required = true)]
	targets: Vec<String>,
	/// Output png file, required by the 'png' output
	#[arg(long, value_name = "FILE")]
	png: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
struct Size {
	rows: usize,
	cols: usize,
}

fn parse_size(s: &str) -> Result<Size, String> {
	const MSG: &str = "expected grid size as '100' or '200x100'";
	if let Ok(x) = s.parse::<usize>() {
		if x > 0 {
			return Ok(Size { rows: x, cols: x });
		}
	}
	let sx: Vec<_> = s.split('x').collect();
	if sx.len() != 2 {
		return Err(MSG.to_owned());
	}
	match (sx[0].parse::<usize>(), sx[1].parse::<usize>()) {
		(Ok(rows), Ok(cols)) if rows > 0 && cols > 0 => Ok(Size { rows, cols }),
		_ => Err(MSG.to_owned()),
	}
}

#[derive(Debug)]
struct Config {
	dimensions: (usize, usize),
	out_ascii: bool,
	out_png: Option<PathBuf>,
	eq: bool,
	recurrent: bool,
	order: bool,
	topplings: bool,
	trace: bool,
	actions: Vec<Action>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum Action {
	Id,
	Read,
	All(Cell),
	Add,
	Dup,
	Inverse,
}

impl Config {
	fn new(cli: Cli) -> anyhow::Result<Config> {
		let mut out_ascii = false;
		let mut out_png = false;
		let mut topplings = false;
		let mut order = false;
		let mut trace = false;
		let mut eq = false;
		let mut recurrent = false;
		let mut actions_expected: i64 = 1;
		match cli.output.as_str() {
			"eq" => {
				eq = true;
				actions_expected = 2;
			}
			"recurrent" => recurrent = true,
			s => {
				for out in s.split('+') {
					match out {
						"ascii" => out_ascii = true,
						"png" => out_png = true,
						"topplings" => topplings = true,
						"order" => order = true,
						"trace" => trace = true,
						_ => bail!(
							"Expected output format either '+'-separated 'ascii', 'png', 'topplings', 'order', and/or 'trace' or sole 'eq' or 'recurrent'. Got: {}",
							out
						),
					}
				}
			}
		}
		let mut actions = Vec::new();
		let mut targets = cli.targets.iter();
		while actions_expected > 0 {
			let arg = match targets.next() {
				Some(s) => s,
				None => bail!("Target list terminated unexpectedly."),
			};
			let (action, incr) = match arg.as_str() {
				"id" => (Action::Id, 0),
				"read" => (Action::Read, 0),
				s if s.starts_with("all-") => match s[4..].parse::<Cell>() {
					Ok(n) => (Action::All(n), 0),
					Err(_) => bail!("In target 'all-N', N must be a 64-bit integer."),
				},
				"inverse" => (Action::Inverse, 1),
				"add" => (Action::Add, 2),
				"dup" => (Action::Dup, 0),
				s => bail!("Unknown target: {}", s),
			};
			actions.push(action);
			actions_expected += incr - 1;
		}
		if let Some(extra) = targets.next() {
			bail!("Unexpected target after a complete expression: {}", extra);
		}
		if actions.last() == Some(&Action::Dup) {
			bail!("'dup' duplicates the next target, so at least 1 more target should follow it.");
		}
		let out_png = match (out_png, cli.png) {
			(true, Some(path)) => Some(path),
			(true, None) => bail!("Please specify the output png file with --png."),
			(false, _) => None,
		};
		Ok(Config {
			dimensions: (cli.size.rows, cli.size.cols),
			out_ascii,
			out_png,
			eq,
			recurrent,
			order,
			topplings,
			trace,
			actions,
		})
	}
}

fn pop(stack: &mut Vec<Sandpile>) -> anyhow::Result<Sandpile> {
	stack.pop().ok_or_else(|| anyhow!("Not enough targets"))
}

/// Reads `rows` non-empty lines, skipping blank ones.
fn read_grid<R: BufRead>(input: R, rows: usize, cols: usize, options: Options) -> anyhow::Result<Sandpile> {
	let mut g = String::new();
	let mut found = 0;
	for line in input.lines() {
		let line = line.context("reading grid from stdin")?;
		if line.trim().is_empty() {
			continue;
		}
		g.push_str(&line);
		g.push('\n');
		found += 1;
		if found == rows {
			break;
		}
	}
	if found < rows {
		bail!("Expected {} rows, input ended after {}", rows, found);
	}
	let a = Sandpile::from_string(&g, options)?;
	if a.shape() != (rows, cols) {
		bail!("Expected a {}x{} grid, got {}x{}", rows, cols, a.rows(), a.cols());
	}
	Ok(a)
}

fn run(config: Config) -> anyhow::Result<()> {
	let (rows, cols) = config.dimensions;
	let leaf = if config.trace {
		Options::deferred()
	} else {
		Options::default()
	};
	let mut registry = Registry::new();
	let mut stack = Vec::new();
	let mut actions = config.actions;
	while let Some(action) = actions.pop() {
		match action {
			Action::Id => stack.push(registry.identity(rows, cols)?.clone()),
			Action::Read => stack.push(read_grid(io::stdin().lock(), rows, cols, leaf)?),
			Action::All(n) => stack.push(Sandpile::with_options(vec![vec![n; cols]; rows], leaf)?),
			Action::Inverse => {
				let mut a = pop(&mut stack)?;
				a.stabilize();
				stack.push(registry.inverse(&a)?);
			}
			Action::Add => {
				let a = pop(&mut stack)?;
				let b = pop(&mut stack)?;
				stack.push(a.add(&b)?);
			}
			Action::Dup => {
				let a = stack.last().cloned().ok_or_else(|| anyhow!("Nothing to duplicate"))?;
				stack.push(a);
			}
		}
	}
	let mut a = pop(&mut stack)?;
	if config.eq {
		let a2 = pop(&mut stack)?;
		println!("{}", a == a2);
		return Ok(());
	}
	if config.recurrent {
		println!("{}", recurrence::is_recurrent(&a));
		return Ok(());
	}
	if config.trace {
		for state in a.trace() {
			println!("{}", state);
		}
		a.stabilize();
	}
	if config.out_ascii {
		println!("{}", a);
	}
	if config.topplings {
		println!("Topplings: {}", a.last_topple());
	}
	if config.order {
		println!("Order: {}", registry.order(&a)?);
	}
	if let Some(filename) = config.out_png {
		png::write_png(&a, &filename)
			.with_context(|| format!("Can't write to file {}", filename.display()))?;
	}
	Ok(())
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(io::stderr)
		.init();
	let config = Config::new(Cli::parse())?;
	run(config)
}
