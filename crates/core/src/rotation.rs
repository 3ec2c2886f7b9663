//! 页面旋转
//!
//! 旋转增量只能是 0/90/180/270 四个值之一，用封闭的枚举表示，
//! 因此任何左转/右转序列都不会产生负值或越界值。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 顺时针旋转角度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    #[serde(rename = "0")]
    R0,
    #[serde(rename = "90")]
    R90,
    #[serde(rename = "180")]
    R180,
    #[serde(rename = "270")]
    R270,
}

/// 旋转方向（左 = 逆时针 90°，右 = 顺时针 90°）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationDirection {
    Left,
    Right,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    /// 将任意整数角度规范化到 [0, 360)
    ///
    /// 非 90 的倍数返回 `None`。
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }

    /// `(current - 90 + 360) % 360`
    pub fn rotate_left(self) -> Self {
        match self {
            Rotation::R0 => Rotation::R270,
            Rotation::R90 => Rotation::R0,
            Rotation::R180 => Rotation::R90,
            Rotation::R270 => Rotation::R180,
        }
    }

    /// `(current + 90) % 360`
    pub fn rotate_right(self) -> Self {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    pub fn rotate(self, direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Left => self.rotate_left(),
            RotationDirection::Right => self.rotate_right(),
        }
    }

    pub fn is_zero(self) -> bool {
        self == Rotation::R0
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// 计算物化时的有效旋转角度
///
/// 有效旋转 = (源页面自带旋转 + 用户旋转增量) mod 360。
/// 必须叠加而不是覆盖，否则会抹掉源文件本身已有的方向。
/// 源页面的 `/Rotate` 理论上总是 90 的倍数；遇到非法值时向下取整到 90 的倍数。
pub fn compose_rotation(intrinsic_degrees: i64, delta: Rotation) -> Rotation {
    let normalized = intrinsic_degrees.rem_euclid(360);
    let snapped = normalized - normalized % 90;
    if snapped != normalized {
        log::warn!(
            "[Rotation] 源页面旋转角度 {} 不是 90 的倍数，按 {} 处理",
            intrinsic_degrees,
            snapped
        );
    }
    Rotation::from_degrees(snapped + i64::from(delta.degrees())).unwrap_or_default()
}
