/*

    Errors raised while editing the scene graph.

    @date: Nov 2025
    @author: bartu
*/

use thiserror::Error;

use crate::numeric::Float;
use crate::scene::ObjectId;

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("no object with id {0:?} in scene")]
    UnknownObject(ObjectId),

    #[error("no object named '{0}' in scene")]
    UnknownName(String),

    #[error("an object named '{0}' already exists")]
    DuplicateName(String),

    #[error("parenting {child:?} to {parent:?} would create a cycle")]
    ParentCycle { child: ObjectId, parent: ObjectId },

    #[error("world matrix of {0:?} is not invertible, cannot keep child transforms")]
    SingularTransform(ObjectId),

    #[error("margin {0} must be a finite number no smaller than -1")]
    InvalidMargin(Float),

    #[error("selection bounds are not finite: {0}")]
    NonFiniteBounds(String),
}
