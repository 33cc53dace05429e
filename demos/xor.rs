use ferrite_mlp::{train_network, ActivationKind, LossKind, Matrix, Network};

fn main() -> ferrite_mlp::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let mut network = Network::with_seed(
        &[2, 4, 1],
        &[ActivationKind::Tanh, ActivationKind::Sigmoid],
        0.1,
        42,
    )?;

    let pairs = [
        ([0.0, 0.0], 0.0),
        ([0.0, 1.0], 1.0),
        ([1.0, 0.0], 1.0),
        ([1.0, 1.0], 0.0),
    ];
    let inputs = pairs.iter().map(|(x, _)| Matrix::column(x)).collect::<ferrite_mlp::Result<Vec<_>>>()?;
    let targets = pairs.iter().map(|(_, y)| Matrix::column(&[*y])).collect::<ferrite_mlp::Result<Vec<_>>>()?;

    let loss = train_network(&mut network, &inputs, &targets, 2000, LossKind::Mse)?;
    println!("Final loss: {loss:.6}");

    for input in &inputs {
        let output = network.predict(input)?;
        println!("Input: {:?} -> Output: {:.4}", input.as_slice(), output.as_slice()[0]);
    }
    Ok(())
}
