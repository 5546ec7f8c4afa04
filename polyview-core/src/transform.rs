/// Cumulative transform state and model matrix construction
use nalgebra::{Matrix4, Vector3};

/// Rotation/translation pair for a secondary drag target such as a light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxTransform {
    /// Degrees, cumulative.
    pub rotation: Vector3<f32>,
    pub translation: Vector3<f32>,
}

impl AuxTransform {
    pub fn at(translation: Vector3<f32>) -> Self {
        Self {
            rotation: Vector3::zeros(),
            translation,
        }
    }

    /// The translation swung around the origin by the rotation.
    pub fn position(&self) -> Vector3<f32> {
        Transform::rotation_matrix(&self.rotation).transform_vector(&self.translation)
    }
}

/// Transform values accumulated from user input.
///
/// Rotation is in degrees and never wrapped. Translation is in viewport
/// pixels. `rotation.x` accumulates horizontal drag and turns the model about
/// its Y axis; `rotation.y` accumulates vertical drag and turns it about X.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformState {
    pub rotation: Vector3<f32>,
    pub translation: Vector3<f32>,
    pub scale: f32,
    pub aux: Vec<AuxTransform>,
}

impl TransformState {
    pub fn identity() -> Self {
        Self::with_aux(Vec::new())
    }

    pub fn with_aux(aux: Vec<AuxTransform>) -> Self {
        Self {
            rotation: Vector3::zeros(),
            translation: Vector3::zeros(),
            scale: 1.0,
            aux,
        }
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation += Vector3::new(dx, dy, dz);
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.translation += Vector3::new(dx, dy, dz);
    }

    /// Restore rotation, translation and scale. Aux targets are kept.
    pub fn reset(&mut self) {
        self.rotation = Vector3::zeros();
        self.translation = Vector3::zeros();
        self.scale = 1.0;
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::identity()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation matrix for accumulated drag angles (degrees).
    ///
    /// Applied as `Rx(-rotation.y) · Ry(rotation.x) · Rz(rotation.z)`.
    pub fn rotation_matrix(rotation: &Vector3<f32>) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(-rotation.y.to_radians(), 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.x.to_radians(), 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z.to_radians()));

        rx * ry * rz
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// Create a uniform scale matrix
    pub fn scale_matrix(scale: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(scale)
    }

    /// Model matrix `T · S · R` for a transform state.
    ///
    /// `world_per_pixel` converts the pixel translation into world units.
    pub fn model_matrix(state: &TransformState, world_per_pixel: f32) -> Matrix4<f32> {
        Self::translation_matrix(&(state.translation * world_per_pixel))
            * Self::scale_matrix(state.scale)
            * Self::rotation_matrix(&state.rotation)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_transform_state() {
        let mut state = TransformState::identity();
        assert_eq!(state.rotation, Vector3::zeros());
        assert_eq!(state.scale, 1.0);

        state.rotate(10.0, 20.0, 30.0);
        state.rotate(400.0, 0.0, 0.0);
        assert_relative_eq!(state.rotation, Vector3::new(410.0, 20.0, 30.0));
    }

    #[test]
    fn test_reset_keeps_aux() {
        let light = AuxTransform::at(Vector3::new(5.0, 5.0, 40.0));
        let mut state = TransformState::with_aux(vec![light]);
        state.rotate(1.0, 2.0, 3.0);
        state.translate(4.0, 5.0, 6.0);
        state.scale = 2.5;
        state.reset();
        assert_eq!(state, TransformState::with_aux(vec![light]));
    }

    #[test]
    fn test_identity_model() {
        let matrix = Transform::model_matrix(&TransformState::identity(), 0.1);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_horizontal_drag_turns_about_y() {
        let matrix = Transform::rotation_matrix(&Vector3::new(90.0, 0.0, 0.0));
        let p = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_model_matrix_order() {
        let mut state = TransformState::identity();
        state.translate(100.0, 0.0, 0.0);
        state.scale = 2.0;
        let matrix = Transform::model_matrix(&state, 0.1);
        let p = matrix.transform_point(&Point3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(p, Point3::new(12.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_aux_position_orbits() {
        let mut aux = AuxTransform::at(Vector3::new(0.0, 0.0, 10.0));
        aux.rotation.x = 90.0;
        assert_relative_eq!(aux.position(), Vector3::new(10.0, 0.0, 0.0), epsilon = 1e-5);
    }
}
