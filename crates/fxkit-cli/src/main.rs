use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use fxkit::{Effect, Parameter, ParameterData};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fxkit",
    about = "Inspect effect bundles and convert them to the compact cache format."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a legacy or compact bundle (auto-detected)
    Dump {
        input: PathBuf,
    },
    /// Re-encode a legacy or compact bundle in the compact format
    Convert {
        input: PathBuf,

        output: PathBuf,

        /// Overwrite the output if it already exists
        #[arg(long, action = clap::ArgAction::SetTrue)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(Args::parse())
}

fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Command::Dump { input } => {
            let effect = load(&input)?;
            print!("{}", describe(&effect));
            Ok(())
        }
        Command::Convert {
            input,
            output,
            force,
        } => {
            let effect = load(&input)?;
            let bytes = fxkit::compact::write_effect_to_vec(&effect)
                .with_context(|| format!("encode {}", input.display()))?;
            let mut file = open_output_file(&output, force)
                .with_context(|| format!("create {}", output.display()))?;
            file.write_all(&bytes)
                .with_context(|| format!("write {}", output.display()))?;
            info!(
                input = %input.display(),
                output = %output.display(),
                bytes = bytes.len(),
                "wrote compact effect"
            );
            Ok(())
        }
    }
}

fn load(path: &Path) -> anyhow::Result<Effect> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    debug!(path = %path.display(), len = bytes.len(), "decoding effect");
    fxkit::read_any(&bytes).with_context(|| format!("decode {}", path.display()))
}

fn open_output_file(path: &Path, force: bool) -> std::io::Result<fs::File> {
    let mut opts = OpenOptions::new();
    opts.write(true);
    if force {
        opts.create(true).truncate(true);
    } else {
        opts.create_new(true);
    }
    opts.open(path)
}

fn payload(p: &Parameter) -> String {
    match &p.data {
        ParameterData::None => String::new(),
        ParameterData::Bytes(bytes) => match p.to_f32_values() {
            Some(values) if p.class.is_numeric() => format!(" = {values:?}"),
            _ => format!(" ({} bytes)", bytes.len()),
        },
        ParameterData::Shared(id) => format!(" -> object {id}"),
        ParameterData::String(s) => format!(" = {s:?}"),
        ParameterData::Shader(blob) => format!(
            " ({:?} {}.{}, {} bytes)",
            blob.stage,
            blob.major,
            blob.minor,
            blob.bytecode.len()
        ),
        ParameterData::Samplers(states) => format!(" ({} sampler states)", states.len()),
        ParameterData::Expression(expression) if expression.array_name.is_empty() => {
            " (expression)".to_owned()
        }
        ParameterData::Expression(expression) => {
            format!(" (selects from {})", expression.array_name)
        }
    }
}

fn describe_parameter(out: &mut String, p: &Parameter, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{indent}{} {:?} {:?}", p.name, p.class, p.ty);
    if p.class.is_numeric() {
        let _ = write!(out, " {}x{}", p.rows, p.columns);
    }
    if !p.elements.is_empty() {
        let _ = write!(out, "[{}]", p.elements.len());
    }
    if !p.semantic.is_empty() {
        let _ = write!(out, " : {}", p.semantic);
    }
    let _ = writeln!(out, "{}", payload(p));
    for annotation in &p.annotations {
        let _ = write!(out, "{indent}  @");
        describe_parameter(out, annotation, 0);
    }
    for member in &p.members {
        describe_parameter(out, member, depth + 1);
    }
}

/// Human-readable summary of `effect`.
fn describe(effect: &Effect) -> String {
    let mut out = String::new();
    let present = effect.objects().iter().flatten().count();
    let _ = writeln!(
        out,
        "objects: {} ({present} present)",
        effect.objects().len()
    );
    for (id, object) in effect.objects().iter().enumerate() {
        if let Some(object) = object {
            let _ = write!(out, "  #{id} ");
            describe_parameter(&mut out, object, 0);
        }
    }

    let _ = writeln!(out, "parameters: {}", effect.parameters().len());
    for p in effect.parameters() {
        describe_parameter(&mut out, p, 1);
    }

    let _ = writeln!(out, "techniques: {}", effect.techniques().len());
    for technique in effect.techniques() {
        let _ = writeln!(out, "  {} ({} passes)", technique.name, technique.passes.len());
        for pass in &technique.passes {
            let _ = writeln!(out, "    {}", pass.name);
            for state in &pass.states {
                let _ = write!(out, "      {}[{}] {:?}", state.name(), state.index, state.kind);
                let _ = writeln!(out, "{}", payload(&state.parameter));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use fxkit::test_utils::sample_effect;
    use pretty_assertions::assert_eq;

    #[test]
    fn describe_lists_every_section() {
        let text = describe(&sample_effect());
        assert!(text.starts_with("objects: 4 (3 present)\n"), "{text}");
        assert!(text.contains("  #0 UIName Object String = \"Opacity\"\n"), "{text}");
        assert!(text.contains("  Weights Scalar Float 1x1[3]\n"), "{text}");
        assert!(text.contains("  DiffuseMap Object Texture2D -> object 3\n"), "{text}");
        assert!(text.contains("techniques: 1\n  Main (1 passes)\n    P0\n"), "{text}");
        assert!(text.contains("VertexShader[0] ExpressionIndex (selects from Weights)"), "{text}");
    }

    #[test]
    fn describe_empty_effect() {
        let text = describe(&Effect::new(vec![], vec![], vec![]));
        assert_eq!(text, "objects: 0 (0 present)\nparameters: 0\ntechniques: 0\n");
    }

    #[test]
    fn convert_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fxkc");
        fs::write(&path, b"existing").unwrap();
        assert!(open_output_file(&path, false).is_err());
        assert!(open_output_file(&path, true).is_ok());
    }
}
