//! Minibatch fitting and tensor conversion helpers.

use burn::module::AutodiffModule;
use burn::optim::{GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::algorithms::actor_critic::{FitOptions, LossHistory};
use crate::core::{MarketState, StateShape};
use crate::error::AgentError;

/// Flatten states into one row-major `[n, L·F]` buffer.
pub fn flatten_states(states: &[MarketState], shape: StateShape) -> Result<Vec<f32>, AgentError> {
    let mut flat = Vec::with_capacity(states.len() * shape.flat_len());
    for state in states {
        state.ensure_shape(shape)?;
        flat.extend_from_slice(state.as_slice());
    }
    Ok(flat)
}

/// Tensor of every row in `flat`.
pub fn rows_tensor<B: Backend>(flat: &[f32], width: usize, device: &B::Device) -> Tensor<B, 2> {
    let rows = flat.len() / width;
    Tensor::<B, 1>::from_floats(flat, device).reshape([rows, width])
}

/// Tensor of the rows at `indices`, in that order.
pub fn gather_rows<B: Backend>(
    flat: &[f32],
    width: usize,
    indices: &[usize],
    device: &B::Device,
) -> Tensor<B, 2> {
    let batch: Vec<f32> = indices
        .iter()
        .flat_map(|&i| &flat[i * width..(i + 1) * width])
        .copied()
        .collect();
    Tensor::<B, 1>::from_floats(batch.as_slice(), device).reshape([indices.len(), width])
}

/// Read a tensor back into host memory.
pub fn read_floats<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>, AgentError> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| AgentError::Model(format!("{:?}", e)))
}

/// Run `options.epochs` passes of minibatch gradient descent.
///
/// `loss_fn` receives the current model and the step indices of one
/// minibatch. Step order is shuffled with `rng`. Each epoch reports the mean minibatch loss. A non-finite loss
/// aborts the fit before the optimizer step that would spread it into the
/// parameters.
pub fn fit_minibatches<B, M, O, R, F>(
    mut model: M,
    optimizer: &mut O,
    rng: &mut R,
    n_samples: usize,
    options: &FitOptions,
    network: &'static str,
    mut loss_fn: F,
) -> Result<(M, LossHistory), AgentError>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
    O: Optimizer<M, B>,
    R: Rng + ?Sized,
    F: FnMut(&M, &[usize]) -> Tensor<B, 1>,
{
    if n_samples == 0 {
        return Err(AgentError::EmptyBatch(network));
    }
    let batch_size = options.batch_size.max(1);

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut epoch_losses = Vec::with_capacity(options.epochs);

    for epoch in 0..options.epochs {
        if options.shuffle {
            indices.shuffle(rng);
        }

        let mut total = 0.0f32;
        let mut batches = 0usize;

        for batch in indices.chunks(batch_size) {
            let loss = loss_fn(&model, batch);
            let value: f32 = loss.clone().into_scalar().elem();
            if !value.is_finite() {
                return Err(AgentError::NonFiniteLoss {
                    network,
                    epoch,
                    loss: value,
                });
            }

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(options.learning_rate, model, grads);

            total += value;
            batches += 1;
        }

        let mean = total / batches as f32;
        log::debug!("{} epoch {}: loss={:.6}", network, epoch, mean);
        epoch_losses.push(mean);
    }

    Ok((model, LossHistory::new(epoch_losses)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_gather_rows_order() {
        let flat = vec![0.0, 1.0, 10.0, 11.0, 20.0, 21.0];
        let device = Default::default();
        let t = gather_rows::<B>(&flat, 2, &[2, 0], &device);
        assert_eq!(t.dims(), [2, 2]);
        assert_eq!(read_floats(t).unwrap(), vec![20.0, 21.0, 0.0, 1.0]);
    }

    #[test]
    fn test_flatten_checks_shape() {
        let shape = StateShape::new(2, 2);
        let good = MarketState::filled(shape, 1.0);
        let bad = MarketState::zeros(StateShape::new(1, 4));

        assert_eq!(flatten_states(&[good.clone(), good.clone()], shape).unwrap().len(), 8);
        assert!(matches!(
            flatten_states(&[good, bad], shape),
            Err(AgentError::StateShape { .. })
        ));
    }

    #[test]
    fn test_rows_tensor() {
        let device = Default::default();
        let t = rows_tensor::<B>(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, &device);
        assert_eq!(t.dims(), [2, 3]);
    }
}
