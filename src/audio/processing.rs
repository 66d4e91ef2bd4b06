use anyhow::Result;
use rubato::{SincFixedIn, SincInterpolationType, SincInterpolationParameters, WindowFunction, Resampler};

/// Averages interleaved frames down to a single channel.
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0,
        params,
        samples.len(),
        1, // mono
    )?;

    let input = vec![samples.to_vec()];
    let output = resampler.process(&input, None)?;

    Ok(output.into_iter().next().unwrap_or_default())
}

/// Renders `samples` so that played back at `sample_rate` they run `rate`
/// times faster (pitch rises with speed, like a tape).
pub fn change_speed(samples: &[f32], sample_rate: u32, rate: f32) -> Result<Vec<f32>> {
    if !rate.is_finite() || rate <= 0.0 {
        anyhow::bail!("Invalid playback rate: {}", rate);
    }
    if (rate - 1.0).abs() < f32::EPSILON {
        return Ok(samples.to_vec());
    }
    let source_rate = (sample_rate as f64 * rate as f64).round() as u32;
    resample(samples, source_rate, sample_rate)
}

/// Converts an integer PCM sample of `bits` width to [-1.0, 1.0].
pub fn int_to_f32(sample: i32, bits: u16) -> f32 {
    let scale = (1i64 << (bits.clamp(1, 32) - 1)) as f32;
    sample as f32 / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_frames() {
        let stereo = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        assert_eq!(downmix_to_mono(&stereo, 2), vec![0.5, 0.5, 0.0]);
        assert_eq!(downmix_to_mono(&[0.25, 0.75], 1), vec![0.25, 0.75]);
    }

    #[test]
    fn int_samples_scale_to_unit_range() {
        assert_eq!(int_to_f32(16384, 16), 0.5);
        assert_eq!(int_to_f32(-32768, 16), -1.0);
        assert_eq!(int_to_f32(64, 8), 0.5);
    }

    #[test]
    fn speed_up_shortens_buffer() {
        let samples: Vec<f32> = (0..8000).map(|i| (i as f32 * 0.01).sin()).collect();
        let faster = change_speed(&samples, 8000, 1.25).unwrap();
        let expected = 6400.0;
        assert!((faster.len() as f32 - expected).abs() < expected * 0.05, "got {}", faster.len());
    }

    #[test]
    fn unit_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(change_speed(&samples, 44100, 1.0).unwrap(), samples);
    }

    #[test]
    fn rejects_non_positive_rate() {
        assert!(change_speed(&[0.0; 4], 44100, 0.0).is_err());
        assert!(change_speed(&[0.0; 4], 44100, -1.0).is_err());
    }
}
