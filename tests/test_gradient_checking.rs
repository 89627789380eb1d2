// Tests for numerical gradient checking using central finite differences.
// These tests verify that the gradients accumulated by backpropagation through
// time match numerical approximations for every layer type.

use char_rnn::architecture::{build_model, LayerConfig};
use char_rnn::layers::{LstmLayer, RecurrentLayer, SimpleRecurrentLayer, SoftmaxLayer};
use char_rnn::train::cross_entropy;
use char_rnn::utils::SimpleRng;
use char_rnn::Sequence;

const STEP: f64 = 1e-5;
const TOLERANCE: f64 = 1e-4;

// ============================================================================
// Helpers
// ============================================================================

// Dense random window in [-1, 1); the carry row stays zero.
fn random_sequence(steps: usize, width: usize, rng: &mut SimpleRng) -> Sequence {
    let mut sequence = Sequence::zeros(steps, width);
    for t in 1..steps {
        for value in sequence.row_mut(t) {
            *value = rng.gen_range_f64(-1.0, 1.0);
        }
    }
    sequence
}

// Loss = Σ_t Σ_j c[t][j] · y[t][j]; its output gradient is exactly c.
// Coefficients stay inside [-1, 1] so clipping is the identity.
fn linear_loss(layer: &mut dyn RecurrentLayer, inputs: &Sequence, coefficients: &Sequence) -> f64 {
    let outputs = layer.forward(inputs, true).unwrap().clone();
    layer.release();
    outputs
        .as_slice()
        .iter()
        .zip(coefficients.as_slice())
        .skip(outputs.width())
        .map(|(y, c)| y * c)
        .sum()
}

// Compare every weight and bias gradient of every gate against finite differences.
fn check_parameter_gradients(layer: &mut dyn RecurrentLayer, inputs: &Sequence, coefficients: &Sequence) {
    layer.forward(inputs, true).unwrap();
    layer.accumulate_gradients(coefficients).unwrap();

    let analytic: Vec<(Vec<f64>, Vec<f64>)> = layer
        .gates()
        .iter()
        .map(|gate| (gate.weight_gradients().to_vec(), gate.bias_gradients().to_vec()))
        .collect();

    for (k, (weight_grads, bias_grads)) in analytic.iter().enumerate() {
        for (i, &expected) in weight_grads.iter().enumerate() {
            let original = layer.gates()[k].weights()[i];

            layer.gates_mut()[k].weights_mut()[i] = original + STEP;
            let plus = linear_loss(layer, inputs, coefficients);
            layer.gates_mut()[k].weights_mut()[i] = original - STEP;
            let minus = linear_loss(layer, inputs, coefficients);
            layer.gates_mut()[k].weights_mut()[i] = original;

            let numerical = (plus - minus) / (2.0 * STEP);
            assert!(
                (numerical - expected).abs() < TOLERANCE,
                "{} gate {} weight {}: numerical {} vs analytic {}",
                layer.kind(),
                k,
                i,
                numerical,
                expected
            );
        }

        for (j, &expected) in bias_grads.iter().enumerate() {
            let original = layer.gates()[k].biases()[j];

            layer.gates_mut()[k].biases_mut()[j] = original + STEP;
            let plus = linear_loss(layer, inputs, coefficients);
            layer.gates_mut()[k].biases_mut()[j] = original - STEP;
            let minus = linear_loss(layer, inputs, coefficients);
            layer.gates_mut()[k].biases_mut()[j] = original;

            let numerical = (plus - minus) / (2.0 * STEP);
            assert!(
                (numerical - expected).abs() < TOLERANCE,
                "{} gate {} bias {}: numerical {} vs analytic {}",
                layer.kind(),
                k,
                j,
                numerical,
                expected
            );
        }
    }
}

// Compare the returned input gradient against finite differences on the inputs.
fn check_input_gradients(layer: &mut dyn RecurrentLayer, inputs: &Sequence, coefficients: &Sequence) {
    layer.forward(inputs, true).unwrap();
    let analytic = layer.accumulate_gradients(coefficients).unwrap();
    layer.reset_gradients();

    assert!(analytic.row(0).iter().all(|&g| g == 0.0));

    let width = inputs.width();
    for index in width..inputs.as_slice().len() {
        let mut shifted = inputs.clone();
        shifted.as_mut_slice()[index] += STEP;
        let plus = linear_loss(layer, &shifted, coefficients);
        shifted.as_mut_slice()[index] -= 2.0 * STEP;
        let minus = linear_loss(layer, &shifted, coefficients);

        let numerical = (plus - minus) / (2.0 * STEP);
        let expected = analytic.as_slice()[index];
        assert!(
            (numerical - expected).abs() < TOLERANCE,
            "{} input {}: numerical {} vs analytic {}",
            layer.kind(),
            index,
            numerical,
            expected
        );
    }
}

// ============================================================================
// Simple recurrent layer
// ============================================================================

#[test]
fn test_rnn_parameter_gradients() {
    let mut rng = SimpleRng::new(101);
    let mut layer = SimpleRecurrentLayer::new(3, 4, 5, &mut rng).unwrap();
    let inputs = random_sequence(5, 3, &mut rng);
    let coefficients = random_sequence(5, 4, &mut rng);

    check_parameter_gradients(&mut layer, &inputs, &coefficients);
}

#[test]
fn test_rnn_input_gradients() {
    let mut rng = SimpleRng::new(102);
    let mut layer = SimpleRecurrentLayer::new(3, 4, 5, &mut rng).unwrap();
    let inputs = random_sequence(5, 3, &mut rng);
    let coefficients = random_sequence(5, 4, &mut rng);

    check_input_gradients(&mut layer, &inputs, &coefficients);
}

// ============================================================================
// LSTM layer
// ============================================================================

#[test]
fn test_lstm_parameter_gradients() {
    let mut rng = SimpleRng::new(201);
    let mut layer = LstmLayer::new(3, 4, 5, &mut rng).unwrap();
    let inputs = random_sequence(5, 3, &mut rng);
    let coefficients = random_sequence(5, 4, &mut rng);

    check_parameter_gradients(&mut layer, &inputs, &coefficients);
}

#[test]
fn test_lstm_input_gradients() {
    let mut rng = SimpleRng::new(202);
    let mut layer = LstmLayer::new(3, 4, 5, &mut rng).unwrap();
    let inputs = random_sequence(5, 3, &mut rng);
    let coefficients = random_sequence(5, 4, &mut rng);

    check_input_gradients(&mut layer, &inputs, &coefficients);
}

#[test]
fn test_lstm_long_window_gradients() {
    let mut rng = SimpleRng::new(203);
    let mut layer = LstmLayer::new(2, 3, 9, &mut rng).unwrap();
    let inputs = random_sequence(9, 2, &mut rng);
    let coefficients = random_sequence(9, 3, &mut rng);

    check_parameter_gradients(&mut layer, &inputs, &coefficients);
}

// ============================================================================
// Softmax output layer
// ============================================================================

#[test]
fn test_softmax_gradients_under_cross_entropy() {
    let mut rng = SimpleRng::new(301);
    let mut layer = SoftmaxLayer::new(4, 3, 5, &mut rng).unwrap();
    let inputs = random_sequence(5, 4, &mut rng);
    let targets = [2, 0, 1, 1];

    let loss_of = |layer: &mut SoftmaxLayer| {
        let probs = layer.forward(&inputs, true).unwrap().clone();
        layer.release();
        cross_entropy(&probs, &targets).unwrap().0
    };

    let probs = layer.forward(&inputs, true).unwrap().clone();
    let (_, grads) = cross_entropy(&probs, &targets).unwrap();
    layer.accumulate_gradients(&grads).unwrap();
    // cross_entropy averages over the predicted steps.
    let scale = targets.len() as f64;
    let weight_grads = layer.gates()[0].weight_gradients().to_vec();

    for (i, &expected) in weight_grads.iter().enumerate() {
        let original = layer.gates()[0].weights()[i];
        layer.gates_mut()[0].weights_mut()[i] = original + STEP;
        let plus = loss_of(&mut layer);
        layer.gates_mut()[0].weights_mut()[i] = original - STEP;
        let minus = loss_of(&mut layer);
        layer.gates_mut()[0].weights_mut()[i] = original;

        let numerical = scale * (plus - minus) / (2.0 * STEP);
        assert!(
            (numerical - expected).abs() < TOLERANCE,
            "softmax weight {}: numerical {} vs analytic {}",
            i,
            numerical,
            expected
        );
    }
}

// ============================================================================
// Stacked model
// ============================================================================

#[test]
fn test_stacked_model_first_layer_gradients() {
    let mut rng = SimpleRng::new(401);
    let mut model = build_model(&[LayerConfig::lstm(4)], 3, 5, &mut rng).unwrap();
    let symbols = [0usize, 2, 1, 0, 1];
    let inputs = Sequence::one_hot(&symbols[..4], 3).unwrap();
    let targets = &symbols[1..];
    let scale = targets.len() as f64;

    let probs = model.forward(&inputs, true).unwrap();
    let (_, grads) = cross_entropy(&probs, targets).unwrap();
    let grad_hidden = model.layers_mut()[1].accumulate_gradients(&grads).unwrap();
    model.layers_mut()[0].accumulate_gradients(&grad_hidden).unwrap();

    let analytic: Vec<Vec<f64>> = model.layers()[0]
        .gates()
        .iter()
        .map(|gate| gate.weight_gradients().to_vec())
        .collect();

    for (k, grads) in analytic.iter().enumerate() {
        for (i, &expected) in grads.iter().enumerate() {
            let original = model.layers()[0].gates()[k].weights()[i];

            model.layers_mut()[0].gates_mut()[k].weights_mut()[i] = original + STEP;
            let plus = {
                let probs = model.forward(&inputs, true).unwrap();
                model.release();
                cross_entropy(&probs, targets).unwrap().0
            };
            model.layers_mut()[0].gates_mut()[k].weights_mut()[i] = original - STEP;
            let minus = {
                let probs = model.forward(&inputs, true).unwrap();
                model.release();
                cross_entropy(&probs, targets).unwrap().0
            };
            model.layers_mut()[0].gates_mut()[k].weights_mut()[i] = original;

            let numerical = scale * (plus - minus) / (2.0 * STEP);
            assert!(
                (numerical - expected).abs() < TOLERANCE,
                "stacked lstm gate {} weight {}: numerical {} vs analytic {}",
                k,
                i,
                numerical,
                expected
            );
        }
    }
}
