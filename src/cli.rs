use crate::{Result, SdeDecoder, SdeEncoding, SdeError};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Write;

pub const SUCCESS: i32 = 0;
pub const FAILURE_UNSPECIFIED: i32 = 1;
pub const FAILURE_ARGUMENTS: i32 = 2;
pub const FAILURE_NO_INPUT: i32 = 3;
pub const FAILURE_FILE_NOT_FOUND: i32 = 4;

pub struct Cli;

impl Cli {
    pub fn build_command() -> Command {
        Command::new("sde2string")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Decodes an ESRI .sde connection file into readable key/value properties")
            .arg(
                Arg::new("input")
                    .short('i')
                    .long("input")
                    .value_name("FILE")
                    .help("Input .sde file to be processed (use '-' for stdin)"),
            )
            .arg(
                Arg::new("encoding")
                    .short('e')
                    .long("encoding")
                    .value_name("NAME")
                    .default_value("ASCII")
                    .help("Blob encoding: DEFAULT|ASCII|UTF7|UTF8|UTF16|UTF32"),
            )
            .arg(
                Arg::new("bracketless")
                    .short('b')
                    .long("bracketless")
                    .help("Remove the brackets from the keys")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("list")
                    .short('l')
                    .long("list")
                    .help("List each property on its own line")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("raw")
                    .short('r')
                    .long("raw")
                    .help("Output the cleaned but unparsed contents")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("unparsed")
                    .short('u')
                    .long("unparsed")
                    .help("Output the decoded, uncleaned contents")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("hex")
                    .short('x')
                    .long("hex")
                    .help("Output a hex dump of the file bytes")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("newline")
                    .short('n')
                    .long("newline")
                    .help("Do not output the trailing newline")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Print progress notes to stderr")
                    .action(ArgAction::SetTrue),
            )
    }

    /// Parse the process arguments, run, and return the exit code.
    pub fn run() -> i32 {
        match Self::build_command().try_get_matches() {
            Ok(matches) => Self::run_with_matches(&matches),
            Err(err) => {
                // --help and --version come through clap's error path
                // but are not failures.
                let code = if err.use_stderr() { FAILURE_ARGUMENTS } else { SUCCESS };
                let _ = err.print();
                code
            }
        }
    }

    pub fn run_with_matches(matches: &ArgMatches) -> i32 {
        let Some(input) = matches.get_one::<String>("input") else {
            let _ = Self::build_command().print_help();
            return FAILURE_NO_INPUT;
        };

        match Self::execute(matches, input) {
            Ok(output) => {
                if matches.get_flag("newline") {
                    print!("{output}");
                    let _ = std::io::stdout().flush();
                } else {
                    println!("{output}");
                }
                SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err}");
                Self::exit_code(&err)
            }
        }
    }

    /// Resolve the selected output mode to its text. Mode precedence:
    /// hex, then list, then unparsed, then raw, then the parsed form.
    fn execute(matches: &ArgMatches, input: &str) -> Result<String> {
        let name = matches
            .get_one::<String>("encoding")
            .map(String::as_str)
            .unwrap_or("ASCII");
        let encoding = SdeEncoding::from_name(name)?;
        let verbose = matches.get_flag("verbose");

        if matches.get_flag("hex") {
            let bytes = if input == "-" {
                SdeDecoder::read_stdin()?
            } else {
                SdeDecoder::read_file(input)?
            };
            return Ok(hex::encode(&bytes));
        }

        let decoded = if input == "-" {
            SdeDecoder::decode_stdin(encoding)?
        } else {
            let bytes = SdeDecoder::read_file(input)?;
            if verbose {
                eprintln!("file found: {input} ({} bytes)", bytes.len());
            }
            SdeDecoder::decode_bytes(&bytes, encoding)?
        };
        let bracketless = matches.get_flag("bracketless");

        if matches.get_flag("list") {
            return Ok(decoded.property_lines(bracketless).join("\n"));
        }
        if matches.get_flag("unparsed") {
            return Ok(decoded.unparsed);
        }
        if matches.get_flag("raw") {
            return Ok(decoded.raw);
        }
        Ok(decoded.connection_string(bracketless))
    }

    fn exit_code(err: &SdeError) -> i32 {
        match err {
            SdeError::FileNotFound(_) => FAILURE_FILE_NOT_FOUND,
            SdeError::UnsupportedEncoding(_) => FAILURE_ARGUMENTS,
            _ => FAILURE_UNSPECIFIED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const SMOKE_BLOB: &[u8] = b"SERVER\x00\x00\x00\x00agdc-gis3\x00\x00\x00\x00DATABASE\
\x00\x00\x00\x00Baker_SDE\x00\x00\x00\x00VERSION\x00\x00\x00\x00sde.DEFAULT";

    fn matches_from(args: &[&str]) -> ArgMatches {
        Cli::build_command().try_get_matches_from(args).unwrap()
    }

    fn fixture(name: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("sde2string-cli-{name}-{}.sde", std::process::id()));
        fs::write(&path, SMOKE_BLOB).unwrap();
        path
    }

    #[test]
    fn command_is_well_formed() {
        Cli::build_command().debug_assert();
        assert_eq!(Cli::build_command().get_name(), "sde2string");
    }

    #[test]
    fn missing_input_exits_with_no_input_code() {
        let matches = matches_from(&["sde2string"]);
        assert_eq!(Cli::run_with_matches(&matches), FAILURE_NO_INPUT);
    }

    #[test]
    fn unknown_flag_is_an_argument_error() {
        let err = Cli::build_command()
            .try_get_matches_from(["sde2string", "--bogus"])
            .unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn missing_file_exits_with_file_not_found_code() {
        let matches = matches_from(&["sde2string", "-i", "/no/such/file.sde"]);
        assert_eq!(Cli::run_with_matches(&matches), FAILURE_FILE_NOT_FOUND);
    }

    #[test]
    fn unknown_encoding_exits_with_argument_code() {
        let matches = matches_from(&["sde2string", "-i", "whatever.sde", "-e", "EBCDIC"]);
        assert_eq!(Cli::run_with_matches(&matches), FAILURE_ARGUMENTS);
    }

    #[test]
    fn parses_a_file_to_a_connection_string() {
        let path = fixture("parse");
        let matches = matches_from(&["sde2string", "-i", path.to_str().unwrap()]);
        let out = Cli::execute(&matches, path.to_str().unwrap());
        fs::remove_file(&path).unwrap();
        assert_eq!(
            out.unwrap(),
            "[SERVER]=agdc-gis3;[DATABASE]=Baker_SDE;[VERSION]=sde.DEFAULT;"
        );
    }

    #[test]
    fn list_mode_emits_one_pair_per_line() {
        let path = fixture("list");
        let matches = matches_from(&["sde2string", "-lb", "-i", path.to_str().unwrap()]);
        let out = Cli::execute(&matches, path.to_str().unwrap());
        fs::remove_file(&path).unwrap();
        assert_eq!(
            out.unwrap(),
            "SERVER=agdc-gis3\nDATABASE=Baker_SDE\nVERSION=sde.DEFAULT"
        );
    }

    #[test]
    fn raw_mode_emits_the_delimited_form() {
        let path = fixture("raw");
        let matches = matches_from(&["sde2string", "-r", "-i", path.to_str().unwrap()]);
        let out = Cli::execute(&matches, path.to_str().unwrap());
        fs::remove_file(&path).unwrap();
        assert_eq!(
            out.unwrap(),
            "SERVER|agdc-gis3|DATABASE|Baker_SDE|VERSION|sde.DEFAULT"
        );
    }

    #[test]
    fn hex_mode_dumps_the_file_bytes() {
        let path = fixture("hex");
        let matches = matches_from(&["sde2string", "-x", "-i", path.to_str().unwrap()]);
        let out = Cli::execute(&matches, path.to_str().unwrap());
        fs::remove_file(&path).unwrap();
        assert_eq!(out.unwrap(), hex::encode(SMOKE_BLOB));
    }
}
