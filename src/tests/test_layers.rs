use ndarray::{arr1, arr2, Array3};
use crate::layers::{Conv2DLayer, DenseLayer, GRULayer, LSTMLayer, LayerTrait, WeightInit};
use crate::activations::Activation;

#[test]
fn test_dense_layer_forward() {
    let layer = DenseLayer::new(3, 2, Activation::Relu).unwrap();
    let input = arr1(&[1.0f32, 2.0, 3.0]);
    let output = LayerTrait::forward(&layer, input.view());
    assert_eq!(output.shape(), [2]);
    assert!(output.iter().all(|&v| v >= 0.0));
}

#[test]
fn test_dense_layer_known_weights() {
    let layer = DenseLayer::new(2, 2, Activation::Linear)
        .unwrap()
        .with_weights(arr2(&[[1.0f32, 0.0], [0.0, -1.0]]))
        .unwrap()
        .with_biases(arr1(&[0.5f32, 0.5]))
        .unwrap();
    let output = layer.forward_batch(arr2(&[[2.0f32, 3.0]]).view());
    assert_eq!(output, arr2(&[[2.5f32, -2.5]]));

    assert!(DenseLayer::new(2, 2, Activation::Linear)
        .unwrap()
        .with_weights(arr2(&[[1.0f32, 0.0, 0.0]]))
        .is_err());
}

#[test]
fn test_weight_initialization() {
    let layer = DenseLayer::with_init(10, 20, Activation::Relu, &WeightInit::XavierUniform).unwrap();
    let limit = (6.0 / 30.0_f32).sqrt();
    for &w in layer.weights.iter() {
        assert!(w >= -limit && w <= limit);
    }

    let layer = DenseLayer::with_init(100, 100, Activation::Relu, &WeightInit::HeNormal).unwrap();
    let var: f32 = layer.weights.iter().map(|&x| x * x).sum::<f32>() / (100.0 * 100.0);
    let expected_var = 2.0 / 100.0;
    assert!((var - expected_var).abs() < 0.005);
}

#[test]
fn test_recurrent_layers_as_flat_layers() {
    // A flat input behaves as a sequence of one step
    let layers: Vec<Box<dyn LayerTrait>> = vec![
        Box::new(LSTMLayer::new(4, 3, false).unwrap()),
        Box::new(GRULayer::new(4, 3, false).unwrap()),
    ];
    let flat = arr2(&[[0.1f32, -0.2, 0.3, 0.4], [1.0, 0.0, -1.0, 0.5]]);
    let sequence = flat.clone().insert_axis(ndarray::Axis(1));

    let lstm = LSTMLayer::new(4, 3, false).unwrap();
    let gru = GRULayer::new(4, 3, false).unwrap();
    let lstm_flat = lstm.forward_batch(flat.view());
    let lstm_seq = lstm.forward_sequence(sequence.view()).unwrap();
    let gru_flat = gru.forward_batch(flat.view());
    let gru_seq = gru.forward_sequence(sequence.view()).unwrap();
    for b in 0..2 {
        for h in 0..3 {
            assert!((lstm_flat[[b, h]] - lstm_seq[[b, 0, h]]).abs() < 1e-6);
            assert!((gru_flat[[b, h]] - gru_seq[[b, 0, h]]).abs() < 1e-6);
        }
    }

    for layer in &layers {
        let cloned = layer.clone();
        assert_eq!(cloned.output_size(), 3);
        assert_eq!(cloned.input_size(), 4);
    }
    assert_eq!(layers[0].num_parameters(), 4 * (4 * 3 + 3 * 3 + 3));
    assert_eq!(layers[1].num_parameters(), 3 * (4 * 3 + 3 * 3 + 3));
}

#[test]
fn test_conv_stack_shapes_chain() {
    let conv1 = Conv2DLayer::new(2, 4, (3, 3), (2, 2), Activation::Relu).unwrap();
    let conv2 = Conv2DLayer::new(4, 8, (2, 2), (1, 1), Activation::Relu).unwrap();
    let input = ndarray::Array4::from_elem((3, 2, 9, 9), 0.5f32);

    let hidden = conv1.forward_batch(input.view()).unwrap();
    assert_eq!(hidden.dim(), (3, 4, 4, 4));
    let output = conv2.forward_batch(hidden.view()).unwrap();
    assert_eq!(output.dim(), (3, 8, 3, 3));
}

#[test]
fn test_recurrent_layers_reject_empty_sequences() {
    let lstm = LSTMLayer::new(2, 2, true).unwrap();
    let gru = GRULayer::new(2, 2, true).unwrap();
    let empty = Array3::<f32>::zeros((1, 0, 2));
    assert!(lstm.forward_sequence(empty.view()).is_err());
    assert!(gru.forward_sequence(empty.view()).is_err());
}
