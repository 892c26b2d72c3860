use clap::Parser;
use ndarray::Array1;
use serde_json::Value;
use std::path::PathBuf;
use std::process;

use swarmkit_heuristic::{Registry, Report};
use swarmkit_testfunctions::{function_names, get_function_metadata};

/// CLI arguments for running one solver on a benchmark function
#[derive(Parser)]
#[command(name = "run_heuristic")]
#[command(about = "Run a metaheuristic on a benchmark function and print the report as JSON")]
struct Args {
	/// Solver name (see --list)
	#[arg(short, long, default_value = "pso")]
	solver: String,

	/// Benchmark function, minimized by negating it
	#[arg(short, long, default_value = "sphere")]
	function: String,

	/// Problem dimension (ignored by fixed-dimension functions)
	#[arg(short, long, default_value_t = 2)]
	dim: usize,

	/// Solver hyperparameters as a JSON object, e.g. '{"max_iter": 200}'
	#[arg(short, long)]
	params: Option<String>,

	/// Seed overriding any seed given in --params
	#[arg(long)]
	seed: Option<u64>,

	/// Write the best-fitness trajectory to this CSV file
	#[arg(short, long)]
	record: Option<PathBuf>,

	/// List solvers and benchmark functions, then exit
	#[arg(long)]
	list: bool,

	/// Pretty-print the JSON report
	#[arg(long)]
	pretty: bool,
}

fn parse_params(params: Option<&str>, seed: Option<u64>) -> Result<Value, Box<dyn std::error::Error>> {
	let mut value = match params {
		Some(text) => serde_json::from_str(text)?,
		None => Value::Object(Default::default()),
	};
	if let Some(seed) = seed {
		match value.as_object_mut() {
			Some(map) => {
				map.insert("seed".to_string(), Value::from(seed));
			}
			None => return Err("--params must be a JSON object".into()),
		}
	}
	Ok(value)
}

fn print_list(registry: &Registry) {
	println!("solvers:");
	for name in registry.names() {
		println!("  {}", name);
	}
	let meta = get_function_metadata();
	println!("functions:");
	for name in function_names() {
		let m = &meta[&name];
		println!("  {:<12} [{}, {}]  {}", name, m.bounds.0, m.bounds.1, m.description);
	}
}

fn run(args: &Args) -> Result<Report, Box<dyn std::error::Error>> {
	let registry = Registry::with_builtins();
	let meta = get_function_metadata();
	let function = meta
		.get(&args.function)
		.ok_or_else(|| format!("unknown function `{}`, try --list", args.function))?;
	if args.dim == 0 {
		return Err("--dim must be at least 1".into());
	}

	let params = parse_params(args.params.as_deref(), args.seed)?;
	let solver = registry.create(&args.solver, &params)?;
	let bounds = function.bounds_for(args.dim);
	let f = function.function;
	let objective = |x: &Array1<f64>| -f(x);

	log::info!(
		"running {} on {} in {}D with bounds [{}, {}]",
		solver.name(),
		function.name,
		bounds.len(),
		function.bounds.0,
		function.bounds.1
	);
	let report = solver.solve(&objective, &bounds)?;
	log::info!(
		"{}: best {} = {:.6e} (known minimum {}) after {} evaluations",
		report.solver,
		function.name,
		-report.fitness,
		function.minimum,
		report.nfev
	);

	if let Some(path) = &args.record {
		report.trajectory.save_to_csv(path)?;
		log::info!("trajectory written to {}", path.display());
	}
	Ok(report)
}

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	if args.list {
		print_list(&Registry::with_builtins());
		return;
	}

	let report = match run(&args) {
		Ok(report) => report,
		Err(e) => {
			eprintln!("error: {}", e);
			process::exit(1);
		}
	};
	let json = if args.pretty { serde_json::to_string_pretty(&report) } else { serde_json::to_string(&report) };
	match json {
		Ok(text) => println!("{}", text),
		Err(e) => {
			eprintln!("error: {}", e);
			process::exit(1);
		}
	}
}
