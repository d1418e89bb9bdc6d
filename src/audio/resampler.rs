//! Batch resampling built on rubato's FFT resampler.

use audioadapter_buffers::direct::InterleavedSlice;
use rubato::{Fft, FixedSync, Resampler};

use super::AudioError;

/// FFT chunk size; one chunk of input is processed per iteration.
const CHUNK_SIZE: usize = 1024;

/// FFT sub-chunk count (higher trades CPU for quality).
const SUB_CHUNKS: usize = 2;

/// Resample a mono buffer from `from_rate` to `to_rate`.
///
/// The whole buffer is processed at once; this is for preparing reference
/// audio, not for streaming. Matching rates return a copy unchanged. The
/// final chunk is zero-padded for the resampler and the output truncated
/// back to the rate-converted length.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler = Fft::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        1, // mono
        FixedSync::Input,
    )
    .map_err(|e| AudioError::Resample(e.to_string()))?;

    let chunk_capacity = resampler.output_frames_max();
    let mut chunk_out = vec![0.0f32; chunk_capacity];

    let expected_len =
        (samples.len() as f64 * f64::from(to_rate) / f64::from(from_rate)).round() as usize;
    let mut output = Vec::with_capacity(expected_len + chunk_capacity);

    for chunk in samples.chunks(CHUNK_SIZE) {
        let padded;
        let input: &[f32] = if chunk.len() < CHUNK_SIZE {
            let mut buf = chunk.to_vec();
            buf.resize(CHUNK_SIZE, 0.0);
            padded = buf;
            &padded
        } else {
            chunk
        };

        let input_adapter = InterleavedSlice::new(input, 1, CHUNK_SIZE)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        let mut output_adapter = InterleavedSlice::new_mut(&mut chunk_out, 1, chunk_capacity)
            .map_err(|e| AudioError::Resample(e.to_string()))?;

        let (_, frames_written) = resampler
            .process_into_buffer(&input_adapter, &mut output_adapter, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;

        output.extend_from_slice(&chunk_out[..frames_written]);
    }

    output.truncate(expected_len);

    Ok(output)
}
