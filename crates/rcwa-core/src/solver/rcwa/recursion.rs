//! Layer-to-layer coupling from the transmission side back to the source.
//!
//! Each layer `i` gets a pair $(A_i, B_i)$ solving
//!
//! $$F_i \begin{bmatrix} A_i \\ B_i \end{bmatrix} = G_{i+1}, \qquad
//!   G_{i+1} = F_{i+1} \begin{bmatrix} I \\ X_{i+1} B_{i+1} A_{i+1}^{-1} X_{i+1} \end{bmatrix}$$
//!
//! with $G_L$ the transmission half-space matrix. The matrix left over after
//! the first layer, $G_0$, is the composite $B'$ that the boundary solve
//! stacks against the reflection half-space. This is the amplitude-coefficient
//! form of a Redheffer star-product chain.

use ndarray::Array2;
use num_complex::Complex;

use super::blocks::{diag, scale_rows, split_rows, stack_rows};
use super::linalg;
use super::modes::LayerModes;
use crate::precision::Precision;
use crate::solver::RcwaError;

type C<P> = Complex<<P as Precision>::Real>;

/// Coefficient pair of one layer and the product $A^{-1} X$ reused by the
/// field back-propagation.
#[derive(Debug, Clone)]
pub struct LayerCoupling<P: Precision> {
    pub a: Array2<C<P>>,
    pub b: Array2<C<P>>,
    /// $A^{-1} X$.
    pub a_inv_x: Array2<C<P>>,
}

impl<P: Precision> LayerCoupling<P> {
    /// Solve $F [A; B] = G$ for one layer.
    fn solve(modes: &LayerModes<P>, target: &Array2<C<P>>, layer: usize) -> Result<Self, RcwaError> {
        let half = 2 * modes.harmonics();
        let ab = linalg::solve::<P>(&modes.f, target, &format!("layer {layer} coupling"))?;
        let (a, b) = split_rows(&ab, half);
        let a_inv_x = linalg::solve::<P>(&a, &diag(&modes.x), &format!("layer {layer} A^-1 X"))?;
        Ok(Self { a, b, a_inv_x })
    }

    /// $F [I; X B A^{-1} X]$, the `4n x 2n` matrix the layer presents to its
    /// neighbour on the source side.
    fn interface_matrix(&self, modes: &LayerModes<P>) -> Array2<C<P>> {
        let half = self.a.nrows();
        let lower = scale_rows(&modes.x, &self.b.dot(&self.a_inv_x));
        modes.f.dot(&stack_rows(&Array2::eye(half), &lower))
    }
}

/// Result of the backward pass.
#[derive(Debug, Clone)]
pub struct CouplingChain<P: Precision> {
    /// Per-layer couplings, reflection side first.
    pub couplings: Vec<LayerCoupling<P>>,
    /// Composite transmission-side matrix $B'$ seen from the reflection
    /// half-space. Equal to the transmission half-space matrix when the
    /// stack is empty.
    pub b_prime: Array2<C<P>>,
}

/// Run the backward pass over `layers` (reflection side first), starting
/// from the transmission half-space matrix `terminal`.
pub fn couple_layers<P: Precision>(
    layers: &[LayerModes<P>],
    terminal: &Array2<C<P>>,
) -> Result<CouplingChain<P>, RcwaError> {
    let mut couplings = Vec::with_capacity(layers.len());
    let mut target = terminal.clone();

    for (index, modes) in layers.iter().enumerate().rev() {
        let coupling = LayerCoupling::solve(modes, &target, index)?;
        target = coupling.interface_matrix(modes);
        couplings.push(coupling);
    }
    couplings.reverse();

    Ok(CouplingChain {
        couplings,
        b_prime: target,
    })
}
