mod load;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use shadowlp_solver::{
    check_feasibility, variable_name, LpProblem, SensitivityVerdict, Solution, SolveResult, Solver,
};

use crate::load::load_problem;
use crate::session::{Perturbation, Session};

#[derive(Parser)]
#[command(name = "shadowlp")]
#[command(about = "Simplex solver with shadow prices and right-hand-side sensitivity", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Pivot limit per phase (default scales with problem size)
    #[arg(long, global = true)]
    max_iterations: Option<usize>,

    /// Numerical tolerance for pricing, ratio tests and shadow prices
    #[arg(long, global = true)]
    tolerance: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a problem in canonical text form
    Show {
        /// Problem file (.json or text)
        file: PathBuf,
    },
    /// Solve a problem and print values, objective and shadow prices
    Solve {
        /// Problem file (.json or text)
        file: PathBuf,
        /// Show binding constraints, reduced costs and rhs ranges
        #[arg(short, long)]
        analysis: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: Format,
    },
    /// Run the coefficient-sum feasibility pre-check
    Check {
        /// Problem file (.json or text)
        file: PathBuf,
        /// Per-constraint rhs deltas applied before checking
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        delta: Vec<f64>,
    },
    /// Solve, perturb the right-hand sides, re-solve and compare shadow prices
    Perturb {
        /// Problem file (.json or text)
        file: PathBuf,
        /// Per-constraint rhs deltas, e.g. `--delta 1,0,-2`
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        delta: Vec<f64>,
        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: Format,
    },
}

fn setup_logger(verbosity: u8) -> Result<(), log::SetLoggerError> {
    use fern::colors::{Color, ColoredLevelConfig};
    let colors = ColoredLevelConfig::new()
        .debug(Color::White)
        .info(Color::Green)
        .warn(Color::BrightYellow)
        .error(Color::BrightRed);

    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} | {:5} | {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logger(cli.verbose) {
        eprintln!("Error setting up logger: {}", e);
    }

    let mut solver = Solver::new();
    if let Some(limit) = cli.max_iterations {
        solver = solver.with_max_iterations(limit);
    }
    if let Some(tolerance) = cli.tolerance {
        solver = solver.with_tolerance(tolerance);
    }

    match cli.command {
        Commands::Show { file } => {
            let problem = load_or_exit(&file);
            println!("{}", problem);
        }
        Commands::Solve {
            file,
            analysis,
            format,
        } => {
            let problem = load_or_exit(&file);
            let mut session = Session::new(solver);
            let result = session.solve(&problem);

            match format {
                Format::Json => print_json(&result),
                Format::Pretty => print_result(&problem, &result, analysis),
            }
            if !result.is_optimal() {
                std::process::exit(1);
            }
        }
        Commands::Check { file, delta } => {
            let problem = load_or_exit(&file);
            let problem = match problem.with_rhs_deltas(&delta) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Invalid perturbation: {}", e);
                    std::process::exit(1);
                }
            };

            let report = check_feasibility(problem.constraints());
            if report.feasible {
                println!("✓ {} passes the feasibility check", file.display());
            } else {
                println!("✗ {} fails the feasibility check", file.display());
                for index in &report.violating {
                    println!("  Constraint {}: {}", index, problem.constraints()[index - 1]);
                }
                std::process::exit(1);
            }
        }
        Commands::Perturb {
            file,
            delta,
            format,
        } => {
            let problem = load_or_exit(&file);
            let mut session = Session::new(solver);

            let baseline = session.solve(&problem);
            if !baseline.is_optimal() {
                info!("baseline solve ended as {:?}", baseline.status());
            }

            let perturbation = match session.perturb(&problem, &delta) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Invalid perturbation: {}", e);
                    std::process::exit(1);
                }
            };

            match format {
                Format::Json => print_perturbation_json(&baseline, &perturbation),
                Format::Pretty => print_perturbation(&perturbation),
            }
            match perturbation {
                Perturbation::Solved { result, .. } if result.is_optimal() => {}
                _ => std::process::exit(1),
            }
        }
    }
}

fn load_or_exit(file: &std::path::Path) -> LpProblem {
    match load_problem(file) {
        Ok(problem) => problem,
        Err(e) => {
            eprintln!("✗ {}: {}", file.display(), e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_perturbation_json(baseline: &SolveResult, perturbation: &Perturbation) {
    let value = match perturbation {
        Perturbation::Flagged(report) => serde_json::json!({
            "baseline": baseline,
            "feasibility": report,
        }),
        Perturbation::Solved {
            problem,
            result,
            verdict,
        } => serde_json::json!({
            "baseline": baseline,
            "problem": problem,
            "result": result,
            "verdict": verdict,
        }),
    };
    print_json(&value);
}

fn print_result(problem: &LpProblem, result: &SolveResult, analysis: bool) {
    match result {
        SolveResult::Optimal(solution) => {
            println!("Status: OPTIMAL");
            print_solution(solution);
            if analysis {
                print_analysis(problem, solution);
            }
        }
        SolveResult::Infeasible => {
            println!("Status: INFEASIBLE");
            println!("No solution exists that satisfies all constraints.");
        }
        SolveResult::Unbounded => {
            println!("Status: UNBOUNDED");
            println!("The problem has no finite optimal solution.");
        }
        SolveResult::InvalidInput(e) => {
            println!("Status: INVALID INPUT");
            println!("{}", e);
        }
        SolveResult::SolverError(e) => {
            println!("Status: ERROR");
            println!("{}", e);
        }
    }
}

fn print_solution(solution: &Solution) {
    for (i, value) in solution.values.iter().enumerate() {
        println!("  {:6} = {:12.4}", variable_name(i), value);
    }
    println!("  {:6} = {:12.4}", "Z", solution.objective_value);
    println!();
    println!("Shadow prices:");
    for (i, price) in solution.shadow_prices.iter().enumerate() {
        println!("  Constraint {:3} {:12.4}", i + 1, price);
    }
}

fn print_analysis(problem: &LpProblem, solution: &Solution) {
    println!();
    println!("Analysis:");
    println!();

    let binding = solution.analysis.binding_constraints();
    if !binding.is_empty() {
        println!("Binding constraints:");
        for index in binding {
            println!("  {:3}: {}", index, problem.constraints()[index - 1]);
        }
        println!();
    }

    println!("Reduced costs (variables not in solution):");
    for rc in &solution.analysis.reduced_costs {
        if !rc.is_basic && rc.reduced_cost.abs() > 0.001 {
            println!(
                "  {:6} objective coefficient must rise by {:.4} to enter solution",
                variable_name(rc.variable),
                rc.reduced_cost
            );
        }
    }
    println!();

    println!("Right-hand-side ranges (shadow prices hold inside):");
    for range in &solution.analysis.rhs_ranges {
        println!(
            "  Constraint {:3} {:12.4} in [{}, {}]",
            range.constraint,
            range.current,
            format_bound(range.lower_bound),
            format_bound(range.upper_bound)
        );
    }
}

fn format_bound(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 { "inf".into() } else { "-inf".into() }
    } else {
        format!("{:.4}", value)
    }
}

fn print_perturbation(perturbation: &Perturbation) {
    match perturbation {
        Perturbation::Flagged(report) => {
            println!("✗ Perturbed problem fails the feasibility check");
            let list: Vec<String> = report.violating.iter().map(|i| i.to_string()).collect();
            println!("  Infeasible constraints: {}", list.join(", "));
        }
        Perturbation::Solved {
            problem,
            result,
            verdict,
        } => {
            println!("Perturbed problem:");
            for line in problem.to_string().lines() {
                println!("  {}", line);
            }
            println!();
            print_result(problem, result, false);

            let Some(verdict) = verdict else {
                return;
            };
            println!();
            match verdict {
                SensitivityVerdict::BasisUnchanged { limits } => {
                    println!("✓ Shadow prices unchanged");
                    for (i, limit) in limits.iter().enumerate() {
                        println!("  Constraint {}: {}", i + 1, limit);
                    }
                }
                SensitivityVerdict::BasisChanged { differing } => {
                    let list: Vec<String> = differing.iter().map(|i| i.to_string()).collect();
                    println!("✗ Shadow prices changed (constraints {})", list.join(", "));
                    println!("  The perturbation moved the optimal basis.");
                }
                SensitivityVerdict::NoBaseline => {
                    println!("! No baseline shadow prices; solve the original problem first");
                }
            }
        }
    }
}
