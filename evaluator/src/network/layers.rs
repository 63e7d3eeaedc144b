use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Linear { inputs: usize, outputs: usize },
    Relu,
}

/// Static description of one stage of the network, in forward order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDescriptor {
    pub name: String,
    pub kind: LayerKind,
}

impl LayerDescriptor {
    pub fn linear(name: impl Into<String>, inputs: usize, outputs: usize) -> Self {
        Self {
            name: name.into(),
            kind: LayerKind::Linear { inputs, outputs },
        }
    }

    pub fn relu(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: LayerKind::Relu,
        }
    }

    /// Number of learnable parameters (weights + biases).
    pub fn num_params(&self) -> usize {
        match self.kind {
            LayerKind::Linear { inputs, outputs } => inputs * outputs + outputs,
            LayerKind::Relu => 0,
        }
    }
}

impl fmt::Display for LayerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            LayerKind::Linear { inputs, outputs } => {
                write!(f, "{}: Linear[{} -> {}]", self.name, inputs, outputs)
            }
            LayerKind::Relu => write!(f, "{}: ReLU", self.name),
        }
    }
}
