use graph_nn::{
    train_loop, ActivationFunction, CostFunction, LayerSpec, Network, NetworkSpec, TrainConfig,
};

fn main() -> graph_nn::Result<()> {
    let spec = NetworkSpec {
        name: "xor".into(),
        input_size: 2,
        layers: vec![
            LayerSpec { size: 4, activation: ActivationFunction::Tanh },
            LayerSpec { size: 2, activation: ActivationFunction::SoftMax },
        ],
        cost: CostFunction::CrossEntropy,
    };
    let mut network = Network::from_spec(&spec)?;

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    // One-hot: [false, true]
    let targets = vec![
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
    ];

    let config = TrainConfig::new(2000, 4, 0.05, 0.9);
    let history = train_loop(&mut network, &inputs, &targets, &config)?;

    for stats in history.iter().step_by(200) {
        println!(
            "Epoch {}: loss = {:.6}, accuracy = {:.2}",
            stats.epoch,
            stats.train_loss,
            stats.train_accuracy.unwrap_or(0.0)
        );
    }

    for input in &inputs {
        let output = network.forward(input)?;
        println!("Input: {:?} -> P(xor) = {:.4}", input, output[1]);
    }
    Ok(())
}
