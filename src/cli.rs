use crate::analysis::{AnalysisReport, analyze};
use crate::config::{OutputFormat, load_config};
use crate::dataset::{Dataset, Variant};
use crate::diagnosis::{DEFAULT_INTERPRETER, DEFAULT_PACKAGES, Diagnostician, Interpreter};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::render::write_output;
use crate::{build_figure, builder};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nutnet",
    version,
    about = "Renders the micronutrient interaction network"
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draw one network variant to PNG or SVG
    Render(RenderArgs),
    /// Print network statistics without drawing
    Analyze(AnalyzeArgs),
    /// Check the Python plotting environment
    Diagnose(DiagnoseArgs),
}

#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Dataset variant
    #[arg(short = 'v', long, value_enum, default_value = "enhanced")]
    pub variant: Variant,

    /// Output file. Defaults to the variant's standard location.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Output format; inferred from the output extension when omitted
    #[arg(short = 'e', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// JSON5 file overriding theme, layout and render settings
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Also write node positions and edges as JSON
    #[arg(long)]
    pub dump_layout: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Dataset variant
    #[arg(short = 'v', long, value_enum, default_value = "enhanced")]
    pub variant: Variant,

    /// Emit the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DiagnoseArgs {
    /// Interpreter to inspect, by name or path
    #[arg(long, default_value = DEFAULT_INTERPRETER)]
    pub python: String,

    /// Package to check; repeatable. Defaults to the plotting stack.
    #[arg(short = 'p', long = "package")]
    pub packages: Vec<String>,

    /// Install missing packages with pip
    #[arg(long)]
    pub install: bool,

    /// Also list every installed package
    #[arg(long)]
    pub list: bool,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => {
            let report = render(&RenderArgs::default())?;
            println!("{report}");
            Ok(())
        }
        Some(Commands::Render(args)) => {
            render(&args)?;
            Ok(())
        }
        Some(Commands::Analyze(args)) => run_analyze(&args),
        Some(Commands::Diagnose(args)) => run_diagnose(&args),
    }
}

fn render(args: &RenderArgs) -> Result<AnalysisReport> {
    let dataset = Dataset::for_variant(args.variant);
    let mut config = load_config(args.config.as_deref(), args.variant)?;
    let (output, format) = resolve_output(args, &dataset, config.render.format);
    config.render.format = format;

    tracing::info!(variant = args.variant.name(), "rendering network");
    let figure = build_figure(&dataset, &config)?;
    write_output(&figure.svg, &output, &config.render)?;

    if let Some(path) = &args.dump_layout {
        let dump = LayoutDump::from_layout(args.variant, &figure.graph, &figure.layout, &config.layout);
        write_layout_dump(path, &dump)?;
    }

    Ok(analyze(&figure.graph, &dataset.groups).with_output(&output))
}

/// Explicit format, then the output extension, then the configured default.
/// The default location takes the extension of the chosen format.
fn resolve_output(args: &RenderArgs, dataset: &Dataset, configured: OutputFormat) -> (PathBuf, OutputFormat) {
    let format = args
        .format
        .or_else(|| args.output.as_deref().and_then(OutputFormat::from_path))
        .unwrap_or(configured);
    let output = match &args.output {
        Some(path) => path.clone(),
        None => dataset.output_path.with_extension(format.extension()),
    };
    (output, format)
}

fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let dataset = Dataset::for_variant(args.variant);
    let graph = builder::build_graph(&dataset, &builder::BuildOptions::default())?;
    let report = analyze(&graph, &dataset.groups);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn run_diagnose(args: &DiagnoseArgs) -> Result<()> {
    let interpreter = Interpreter::locate(&args.python);
    tracing::debug!(program = %interpreter.program.display(), "diagnosing interpreter");
    let packages: Vec<&str> = if args.packages.is_empty() {
        DEFAULT_PACKAGES.to_vec()
    } else {
        args.packages.iter().map(String::as_str).collect()
    };
    let diagnostician = Diagnostician::system(interpreter);
    let mut report = diagnostician.run(&packages, args.install);
    if args.list {
        report.installed = Some(diagnostician.list_installed());
    }
    println!("{report}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_no_subcommand() {
        let cli = Cli::try_parse_from(["nutnet"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn render_flags() {
        let cli = Cli::try_parse_from([
            "nutnet", "render", "-v", "coloured", "-o", "out/x.svg", "--dump-layout", "out/x.json",
            "--debug",
        ])
        .unwrap();
        assert!(cli.debug);
        let Some(Commands::Render(args)) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.variant, Variant::Coloured);
        assert_eq!(args.output, Some(PathBuf::from("out/x.svg")));
        assert_eq!(args.dump_layout, Some(PathBuf::from("out/x.json")));
    }

    #[test]
    fn diagnose_collects_packages() {
        let cli =
            Cli::try_parse_from(["nutnet", "diagnose", "-p", "numpy", "-p", "scipy", "--install"])
                .unwrap();
        let Some(Commands::Diagnose(args)) = cli.command else {
            panic!("expected diagnose");
        };
        assert_eq!(args.packages, vec!["numpy", "scipy"]);
        assert_eq!(args.python, "python3");
        assert!(args.install);
        assert!(!args.list);

        let cli = Cli::try_parse_from(["nutnet", "diagnose", "--list"]).unwrap();
        let Some(Commands::Diagnose(args)) = cli.command else {
            panic!("expected diagnose");
        };
        assert!(args.list);
        assert!(args.packages.is_empty());
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(Cli::try_parse_from(["nutnet", "render", "-v", "minerals"]).is_err());
    }

    #[test]
    fn output_resolution() {
        let dataset = Dataset::enhanced();

        let (path, format) = resolve_output(&RenderArgs::default(), &dataset, OutputFormat::Png);
        assert_eq!(path, PathBuf::from("images/micronutrient_network_enhanced.png"));
        assert_eq!(format, OutputFormat::Png);

        let (path, format) = resolve_output(&RenderArgs::default(), &dataset, OutputFormat::Svg);
        assert_eq!(path, PathBuf::from("images/micronutrient_network_enhanced.svg"));
        assert_eq!(format, OutputFormat::Svg);

        let args = RenderArgs {
            output: Some(PathBuf::from("fig.svg")),
            ..RenderArgs::default()
        };
        assert_eq!(resolve_output(&args, &dataset, OutputFormat::Png).1, OutputFormat::Svg);

        let args = RenderArgs {
            output: Some(PathBuf::from("fig.svg")),
            format: Some(OutputFormat::Png),
            ..RenderArgs::default()
        };
        assert_eq!(resolve_output(&args, &dataset, OutputFormat::Svg).1, OutputFormat::Png);
    }
}
