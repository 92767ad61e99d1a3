/// Movement keys currently held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl InputState {
    /// Forward and rightward intent, each in -1..=1.
    pub fn axes(&self) -> (f32, f32) {
        let axis = |pos: bool, neg: bool| pos as i32 as f32 - neg as i32 as f32;
        (
            axis(self.forward, self.backward),
            axis(self.right, self.left),
        )
    }
}
