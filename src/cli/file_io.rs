//! File handling for the CLI: read sample buffers, compress a file list
//! with one shared context, write `.air` frames.

use std::fs;
use std::io::{Read, Write};

use anyhow::{bail, Context as _, Result};

use airspace::{cal_work_buf_size, compress_bound, CmpContext, CmpParams};

use crate::cli::log::{log_debug, log_info, log_verbose};
use crate::cli::{AIRSPACE_EXTENSION, STDIN_MARK, STDOUT_MARK};

/// 8-byte-aligned byte buffer for the frame destination.
struct AlignedBuf {
    backing: Vec<u8>,
    off: usize,
    len: usize,
}

impl AlignedBuf {
    fn new(len: usize) -> Self {
        let backing = vec![0u8; len + 8];
        let off = backing.as_ptr().align_offset(8);
        AlignedBuf { backing, off, len }
    }

    fn slice(&mut self) -> &mut [u8] {
        &mut self.backing[self.off..self.off + self.len]
    }

    fn frame(&self, size: usize) -> &[u8] {
        &self.backing[self.off..self.off + size]
    }
}

/// Reads one input (file or the stdin mark) as native-endian `u16` samples.
fn read_samples(input: &str) -> Result<Vec<u16>> {
    let bytes = if input == STDIN_MARK {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("reading standard input")?;
        buf
    } else {
        fs::read(input).with_context(|| format!("reading '{input}'"))?
    };

    if bytes.len() % 2 != 0 {
        bail!("'{input}': size {} is not a whole number of 16-bit samples", bytes.len());
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
        .collect())
}

fn write_frame(output: &str, frame: &[u8]) -> Result<()> {
    if output == STDOUT_MARK {
        std::io::stdout()
            .write_all(frame)
            .context("writing to standard output")?;
    } else {
        fs::write(output, frame).with_context(|| format!("writing '{output}'"))?;
    }
    Ok(())
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

fn ratio_line(input: &str, input_size: u64, output: &str, output_size: u64) -> String {
    let ratio = if input_size == 0 {
        100.0
    } else {
        output_size as f64 / input_size as f64 * 100.0
    };
    format!(
        "{input}: {ratio:.2}% ({} => {}, {output})",
        human_size(input_size),
        human_size(output_size)
    )
}

/// Compresses every input into its own frame, sharing one context (and thus
/// one session sequence) across the list.
///
/// `output_name` forces a single output target; without it each input gets
/// its own `<input>.air` file. The work buffer is sized from the first
/// input.
pub fn compress_file_list(
    output_name: Option<&str>,
    inputs: &[String],
    params: &CmpParams,
) -> Result<()> {
    // The first input is read up front so the work buffer can be sized from
    // real data (stdin has no size to stat) and is handed to the loop below.
    let first_samples = read_samples(&inputs[0])?;
    let first_size = u32::try_from(first_samples.len() as u64 * 2).unwrap_or(u32::MAX);
    let work_buf_size = cal_work_buf_size(params, first_size)
        .context("calculating work buffer size")? as usize;

    let mut work_backing = vec![0u8; work_buf_size + 2];
    let work_off = work_backing.as_ptr().align_offset(2);
    let work_buf = if work_buf_size > 0 {
        log_debug!("allocated {work_buf_size} B work buffer");
        Some(&mut work_backing[work_off..work_off + work_buf_size])
    } else {
        None
    };

    let mut ctx = CmpContext::new(params, work_buf)
        .context("initialising compression context")?;

    let mut sum_input: u64 = 0;
    let mut sum_output: u64 = 0;
    let mut last_output = String::new();
    let mut pending = Some(first_samples);

    for input in inputs {
        let samples = match pending.take() {
            Some(samples) => samples,
            None => read_samples(input)?,
        };
        let src_size = samples.len() as u64 * 2;

        let bound = compress_bound(u32::try_from(src_size).unwrap_or(u32::MAX))
            .with_context(|| format!("sizing destination for '{input}'"))?;

        let mut dst = AlignedBuf::new(bound as usize);
        let frame_size = ctx
            .compress_u16(dst.slice(), &samples)
            .with_context(|| format!("compressing '{input}'"))?;

        let output = match output_name {
            Some(name) => name.to_owned(),
            None => format!("{input}{AIRSPACE_EXTENSION}"),
        };
        write_frame(&output, dst.frame(frame_size as usize))?;

        log_verbose!("{}", ratio_line(input, src_size, &output, u64::from(frame_size)));
        sum_input += src_size;
        sum_output += u64::from(frame_size);
        last_output = output;
    }

    if inputs.len() == 1 {
        log_info!("{}", ratio_line(&inputs[0], sum_input, &last_output, sum_output));
    } else {
        let ratio = if sum_input == 0 {
            100.0
        } else {
            sum_output as f64 / sum_input as f64 * 100.0
        };
        log_info!(
            "{} files compressed: {ratio:.2}% ({} => {})",
            inputs.len(),
            human_size(sum_input),
            human_size(sum_output)
        );
    }

    Ok(())
}
