use crate::call::enum_info::EnumError;
use crate::shape::ShapeError;

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),
    #[error("enum error: {0}")]
    Enum(#[from] EnumError),
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::shape::{Shape, ShapeError};

    fn batched_count(outer: &Shape, inner: &Shape) -> Result<usize, Error> {
        let call_shape = outer.concat(inner)?;
        Ok(call_shape.element_count()?)
    }

    #[test]
    fn test_from_shape_error() {
        assert_eq!(
            batched_count(&crate::shape![4], &crate::shape![16, 16]).unwrap(),
            1024
        );
        assert_eq!(
            batched_count(&Shape::new(), &crate::shape![16]).expect_err(""),
            Error::Shape(ShapeError::InvalidShapeAccess)
        );
        assert_eq!(
            batched_count(&crate::shape![-1], &crate::shape![16])
                .expect_err("")
                .to_string(),
            "shape error: shape has dynamic dimensions"
        );
    }
}
