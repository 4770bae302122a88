mod args;

use std::{fs::File, process::ExitCode, thread};
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use crossbeam::channel;
use env_logger::Env;

use anvil_sections_chunk::{ChunkDocument, DecodedChunk, SectionDecodeOptions};

use self::args::{Args, Command, HELP};


/// Pass a list of chunk JSON files to the program, as extracted from a region file's NBT.
/// Each one is decoded into a JSON file with the palette indices of every section.
fn main() -> ExitCode {
    let args = match Command::parse(std::env::args().skip(1)) {
        Ok(Command::Decode(args)) => args,
        Ok(Command::Help) => {
            println!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            println!("{err}");
            println!();
            println!("{HELP}");
            return ExitCode::from(2);
        }
    };

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if decode_all(&args) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Returns `true` if every file was decoded and written successfully.
fn decode_all(args: &Args) -> bool {
    let opts = args.section_decode_options();
    let pretty = args.pretty;

    let (task_sender, task_receiver) = channel::bounded::<(PathBuf, PathBuf)>(args.file_threads());
    let (result_sender, result_receiver) = channel::unbounded();

    let workers: Vec<_> = (0..args.file_threads())
        .map(|_| {
            let task_receiver = task_receiver.clone();
            let result_sender = result_sender.clone();

            thread::spawn(move || {
                while let Ok((input, output)) = task_receiver.recv() {
                    let result = decode_file(&input, &output, opts, pretty);
                    if result_sender.send((input, output, result)).is_err() {
                        break;
                    }
                }
            })
        })
        .collect();

    // Only the workers should keep these alive.
    drop(task_receiver);
    drop(result_sender);

    for input in &args.inputs {
        let output = args.output_path(input);
        if task_sender.send((input.clone(), output)).is_err() {
            log::error!("Every worker thread stopped early");
            break;
        }
    }
    drop(task_sender);

    let mut all_succeeded = true;
    for (input, output, result) in result_receiver {
        match result {
            Ok(decoded) => {
                println!(
                    "{} -> {}: {} sections decoded, {} skipped",
                    input.display(),
                    output.display(),
                    decoded.sections,
                    decoded.skipped,
                );
            }
            Err(err) => {
                log::error!("{err:#}");
                all_succeeded = false;
            }
        }
    }

    for worker in workers {
        if worker.join().is_err() {
            log::error!("A worker thread panicked");
            all_succeeded = false;
        }
    }

    all_succeeded
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileSummary {
    sections: usize,
    skipped:  usize,
}

fn decode_file(
    input:  &Path,
    output: &Path,
    opts:   SectionDecodeOptions,
    pretty: bool,
) -> anyhow::Result<FileSummary> {
    let chunk = ChunkDocument::from_path(input)
        .with_context(|| format!("could not read a chunk from {}", input.display()))?;

    log::debug!(
        "{}: chunk ({}, {}) with {} sections",
        input.display(), chunk.x_pos, chunk.z_pos, chunk.sections.len(),
    );

    let decoded = chunk
        .decode(opts)
        .with_context(|| format!("could not decode the chunk in {}", input.display()))?;

    if log::log_enabled!(log::Level::Debug) {
        log_sections(input, &decoded);
    }

    let file = File::create(output)
        .with_context(|| format!("could not create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    decoded
        .write_json(&mut writer, pretty)
        .and_then(|()| Ok(writer.flush()?))
        .with_context(|| format!("could not write the decoded chunk to {}", output.display()))?;

    Ok(FileSummary {
        sections: decoded.sections.len(),
        skipped:  decoded.failures.len(),
    })
}

/// Log the most common block of each section.
fn log_sections(input: &Path, decoded: &DecodedChunk) {
    for section in &decoded.sections {
        let counts = section.block_counts();
        let Some((most_common, &count)) = counts
            .iter()
            .enumerate()
            .max_by_key(|&(_, &count)| count)
        else {
            continue;
        };

        let block = &section.palette()[most_common];
        let name = block
            .identifier()
            .map(|identifier| identifier.to_string())
            .unwrap_or_else(|_| block.name.clone());

        log::debug!(
            "{}: section {} has {} palette entries, mostly {name} ({count} blocks)",
            input.display(), section.y, section.palette().len(),
        );
    }
}
