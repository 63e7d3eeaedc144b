use candle_core::{DType, Device, Result, Tensor};
use candle_nn::{Module, VarBuilder, VarMap};
use rand::Rng;

use crate::config::NetworkConfig;
use crate::network::{CpuNetwork, LayerKind, Network};

/// Creates a random input vector shaped like encoded boards (small integers)
fn create_random_input(width: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..width).map(|_| rng.gen_range(0..8) as f32).collect()
}

fn candle_score(network: &Network, input: &[f32]) -> Result<f32> {
    let input_tensor = Tensor::from_slice(input, (1, input.len()), &Device::Cpu)?;
    network
        .forward(&input_tensor)
        .and_then(|t| t.get(0))
        .and_then(|t| t.get(0))
        .and_then(|t| t.to_scalar::<f32>())
}

#[test]
fn test_cpu_network_matches_candle() -> Result<()> {
    for hidden in [vec![64], vec![256, 256]] {
        let config = NetworkConfig::new(138, hidden).unwrap();

        let vm = VarMap::new();
        let vb = VarBuilder::from_varmap(&vm, DType::F32, &Device::Cpu);
        let candle_network = Network::new(&config, &vb)?;
        let mut cpu_network = CpuNetwork::from_network(&candle_network)?;

        for _ in 0..20 {
            let input = create_random_input(config.input_width);
            let network_result = candle_score(&candle_network, &input)?;
            let cpu_result = cpu_network.forward(&input).unwrap();

            assert_approx_eq(network_result, cpu_result, "Values");
        }
    }

    Ok(())
}

#[test]
fn test_descriptors_follow_config() -> Result<()> {
    let config = NetworkConfig::default();
    let vm = VarMap::new();
    let vb = VarBuilder::from_varmap(&vm, DType::F32, &Device::Cpu);
    let network = Network::new(&config, &vb)?;

    let kinds: Vec<LayerKind> = network.descriptors().iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            LayerKind::Linear {
                inputs: 138,
                outputs: 256
            },
            LayerKind::Relu,
            LayerKind::Linear {
                inputs: 256,
                outputs: 256
            },
            LayerKind::Relu,
            LayerKind::Linear {
                inputs: 256,
                outputs: 1
            },
        ]
    );

    // Every learnable parameter is described
    let described: usize = network.descriptors().iter().map(|d| d.num_params()).sum();
    let stored: usize = vm.all_vars().iter().map(|v| v.elem_count()).sum();
    assert_eq!(described, stored);

    let names: Vec<String> = network.descriptors().iter().map(|d| d.to_string()).collect();
    assert_eq!(names[0], "hidden0: Linear[138 -> 256]");
    assert_eq!(names[4], "output: Linear[256 -> 1]");

    Ok(())
}

/// Asserts that two floating point values are within EPSILON of each other
fn assert_approx_eq(a: f32, b: f32, description: &str) {
    const EPSILON: f32 = 1e-4;

    assert!(
        (a - b).abs() < EPSILON * a.abs().max(1.0),
        "{} differ by more than epsilon: |{} - {}| = {} > {}",
        description,
        a,
        b,
        (a - b).abs(),
        EPSILON
    );
}
