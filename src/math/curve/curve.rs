/// 唯讀的 x/y 序列介面，`XySequence` 與 `MutableXySequence` 共用。
///
/// x 值嚴格遞增，長度至少為 1（由建構子保證）。
pub trait Curve {
    fn xs(&self) -> &[f64];

    fn ys(&self) -> &[f64];

    fn size(&self) -> usize {
        self.xs().len()
    }

    fn x(&self, index: usize) -> f64 {
        self.xs()[index]
    }

    fn y(&self, index: usize) -> f64 {
        self.ys()[index]
    }

    fn min_x(&self) -> f64 {
        self.xs()[0]
    }

    fn max_x(&self) -> f64 {
        self.xs()[self.size() - 1]
    }

    /// 兩條曲線的 x 值逐點完全相同（bitwise）。
    fn same_x_domain(&self, other: &dyn Curve) -> bool {
        self.xs() == other.xs()
    }

    fn is_clear(&self) -> bool {
        self.ys().iter().all(|&y| y == 0.0)
    }
}
