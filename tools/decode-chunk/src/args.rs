use std::{collections::HashSet, num::NonZeroUsize, path::{Path, PathBuf}, thread};

use thiserror::Error;

use anvil_sections_chunk::{FailurePolicy, PackingSelection, SectionDecodeOptions};
use anvil_sections_packed_indices::PackingMode;


pub(crate) const HELP: &str = "\
Decode the block-state sections of Java Edition chunks extracted to JSON.

Usage: decode-chunk [OPTIONS] <INPUT.json>...

Each input is written to <INPUT>.decoded.json, unless --out is given.

Options:
  --out=<path>        Write the decoded chunk here (only with a single input)
  --packing=<mode>    aligned, spanning, or auto (by DataVersion; the default)
  --skip-invalid      Skip sections with invalid packed data instead of failing the chunk
  --threads=<n>       Number of worker threads
  --pretty            Pretty-print the output JSON
  --verbose           Log at debug level (RUST_LOG takes precedence)
  --help              Print this text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Help,
    Decode(Args),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Args {
    pub(crate) inputs:         Vec<PathBuf>,
    pub(crate) out:            Option<PathBuf>,
    pub(crate) packing:        PackingSelection,
    pub(crate) failure_policy: FailurePolicy,
    pub(crate) threads:        NonZeroUsize,
    pub(crate) pretty:         bool,
    pub(crate) verbose:        bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ArgsError {
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("bad {0} argument, missing value")]
    MissingValue(&'static str),
    #[error("unknown packing mode \"{0}\" (expected aligned, spanning, or auto)")]
    UnknownPacking(String),
    #[error("bad thread count \"{0}\"")]
    InvalidThreads(String),
    #[error("no input files given")]
    NoInputs,
    #[error("--out can only be used with a single input, but {0} were given")]
    OutWithManyInputs(usize),
    #[error("more than one input would be decoded to {}", .0.display())]
    DuplicateOutput(PathBuf),
}

impl Command {
    pub(crate) fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ArgsError> {
        let mut inputs = Vec::new();
        let mut out = None;
        let mut packing = PackingSelection::ByDataVersion;
        let mut failure_policy = FailurePolicy::Abort;
        let mut threads = None;
        let mut pretty = false;
        let mut verbose = false;

        for arg in args {
            if arg == "--help" || arg == "-h" {
                return Ok(Self::Help);
            } else if arg == "--skip-invalid" {
                failure_policy = FailurePolicy::Skip;
            } else if arg == "--pretty" {
                pretty = true;
            } else if arg == "--verbose" {
                verbose = true;
            } else if let Some(path) = arg.strip_prefix("--out=") {
                if path.is_empty() {
                    return Err(ArgsError::MissingValue("--out="));
                }
                out = Some(PathBuf::from(path));
            } else if let Some(mode) = arg.strip_prefix("--packing=") {
                packing = match mode {
                    "aligned"  => PackingSelection::Fixed(PackingMode::Aligned),
                    "spanning" => PackingSelection::Fixed(PackingMode::Spanning),
                    "auto"     => PackingSelection::ByDataVersion,
                    ""         => return Err(ArgsError::MissingValue("--packing=")),
                    other      => return Err(ArgsError::UnknownPacking(other.to_owned())),
                };
            } else if let Some(count) = arg.strip_prefix("--threads=") {
                let count = count
                    .parse::<NonZeroUsize>()
                    .map_err(|_err| ArgsError::InvalidThreads(count.to_owned()))?;
                threads = Some(count);
            } else if arg.starts_with("--") {
                return Err(ArgsError::UnknownArgument(arg));
            } else {
                inputs.push(PathBuf::from(arg));
            }
        }

        if inputs.is_empty() {
            return Err(ArgsError::NoInputs);
        }
        if out.is_some() && inputs.len() > 1 {
            return Err(ArgsError::OutWithManyInputs(inputs.len()));
        }

        let threads = threads.unwrap_or_else(|| {
            thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
        });

        let args = Args {
            inputs,
            out,
            packing,
            failure_policy,
            threads,
            pretty,
            verbose,
        };

        // Otherwise, two workers would write the same file.
        let mut outputs = HashSet::new();
        for input in &args.inputs {
            let output = args.output_path(input);
            if !outputs.insert(output.clone()) {
                return Err(ArgsError::DuplicateOutput(output));
            }
        }

        Ok(Self::Decode(args))
    }
}

impl Args {
    /// Where the decoded version of `input` is written.
    pub(crate) fn output_path(&self, input: &Path) -> PathBuf {
        match &self.out {
            Some(out) => out.clone(),
            None      => input.with_extension("decoded.json"),
        }
    }

    /// Options for decoding the sections of one chunk. When several files are decoded at once,
    /// the threads are spent on files instead of sections.
    pub(crate) fn section_decode_options(&self) -> SectionDecodeOptions {
        let threads = if self.inputs.len() == 1 {
            self.threads
        } else {
            NonZeroUsize::MIN
        };

        SectionDecodeOptions {
            packing:        self.packing,
            failure_policy: self.failure_policy,
            threads,
        }
    }

    /// The number of files decoded concurrently.
    pub(crate) fn file_threads(&self) -> usize {
        self.threads.get().min(self.inputs.len()).max(1)
    }
}
