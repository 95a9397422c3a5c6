use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rst2rfcxml")]
#[command(author, version)]
#[command(about = "Convert reStructuredText to xml2rfc XML")]
#[command(after_help = "\
EXAMPLES:

    # Convert a draft to stdout
    rst2rfcxml draft.rst

    # Concatenate several inputs into one document
    rst2rfcxml -o draft.xml front.rst body.rst

    # Use a JSON options file
    rst2rfcxml --config rst2rfcxml.json draft.rst

Example rst2rfcxml.json:

    {
      \"baseTargetUri\": \"https://example.com/spec\",
      \"emitBackMatter\": true
    }

Set RUST_LOG=debug to trace directives, includes and sections.")]
pub struct Cli {
    /// Write the XML here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// JSON file with conversion options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Prefix for relative reference targets (overrides the config file)
    #[arg(long, value_name = "URI")]
    pub base_target_uri: Option<String>,

    /// Input files, converted in order into a single document
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags_and_inputs() {
        let cli = Cli::try_parse_from([
            "rst2rfcxml",
            "-o",
            "out.xml",
            "--base-target-uri",
            "https://example.com",
            "a.rst",
            "b.rst",
        ])
        .unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("out.xml")));
        assert_eq!(cli.base_target_uri.as_deref(), Some("https://example.com"));
        assert_eq!(cli.inputs, vec![PathBuf::from("a.rst"), PathBuf::from("b.rst")]);
    }

    #[test]
    fn inputs_are_required() {
        assert!(Cli::try_parse_from(["rst2rfcxml"]).is_err());
    }
}
