//! Fixed-size float vectors (2, 3 and 4 components)
use bytemuck::{Pod, Zeroable};
use std::ops;

macro_rules! vec_op_impl {
    ($trait: ident, $func: ident, $v: ident, $($e: ident),*) => {
        impl ops::$trait<$v> for $v {
            type Output = $v;

            #[inline]
            fn $func(self, rhs: $v) -> $v {
                $v { $( $e: ops::$trait::$func(self.$e, rhs.$e), )* }
            }
        }
    }
}

macro_rules! vec_assign_op_impl {
    ($trait: ident, $func: ident, $v: ident, $($e: ident),*) => {
        impl ops::$trait<$v> for $v {
            #[inline]
            fn $func(&mut self, rhs: $v) {
                $( ops::$trait::$func(&mut self.$e, rhs.$e); )*
            }
        }
    }
}

macro_rules! scalar_op_impl {
    ($trait: ident, $func: ident, $v: ident, $($e: ident),*) => {
        impl ops::$trait<f32> for $v {
            type Output = $v;

            #[inline]
            fn $func(self, rhs: f32) -> $v {
                $v { $( $e: ops::$trait::$func(self.$e, rhs), )* }
            }
        }
    }
}

macro_rules! scalar_assign_op_impl {
    ($trait: ident, $func: ident, $v: ident, $($e: ident),*) => {
        impl ops::$trait<f32> for $v {
            #[inline]
            fn $func(&mut self, rhs: f32) {
                $( ops::$trait::$func(&mut self.$e, rhs); )*
            }
        }
    }
}

macro_rules! vec_impl {
    ($v: ident, $n: literal, $($e: ident),*) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Pod, Zeroable)]
        #[repr(C)]
        pub struct $v {
            $( pub $e: f32, )*
        }

        impl $v {
            pub const ZERO: $v = $v { $( $e: 0.0, )* };

            #[inline]
            pub const fn new($( $e: f32 ),*) -> $v {
                $v { $( $e, )* }
            }

            #[inline]
            pub fn dot(self, rhs: $v) -> f32 {
                0.0 $( + self.$e * rhs.$e )*
            }

            #[inline]
            pub fn length_squared(self) -> f32 {
                self.dot(self)
            }

            #[inline]
            pub fn length(self) -> f32 {
                self.length_squared().sqrt()
            }

            /// Unit vector in the direction of `self`.
            ///
            /// A zero vector has no direction; debug builds assert on it and
            /// release builds return non-finite components.
            #[inline]
            pub fn normalize(self) -> $v {
                let length = self.length();
                debug_assert!(length > 0.0, "normalize called on a zero-length vector");
                self / length
            }

            #[inline]
            pub fn to_array(self) -> [f32; $n] {
                [$( self.$e ),*]
            }
        }

        impl From<[f32; $n]> for $v {
            #[inline]
            fn from(a: [f32; $n]) -> $v {
                let [$( $e ),*] = a;
                $v { $( $e, )* }
            }
        }

        impl ops::Neg for $v {
            type Output = $v;

            #[inline]
            fn neg(self) -> $v {
                $v { $( $e: -self.$e, )* }
            }
        }

        impl ops::Mul<$v> for f32 {
            type Output = $v;

            #[inline]
            fn mul(self, rhs: $v) -> $v {
                rhs * self
            }
        }

        vec_op_impl!(Add, add, $v, $($e),*);
        vec_op_impl!(Sub, sub, $v, $($e),*);
        vec_assign_op_impl!(AddAssign, add_assign, $v, $($e),*);
        vec_assign_op_impl!(SubAssign, sub_assign, $v, $($e),*);
        scalar_op_impl!(Mul, mul, $v, $($e),*);
        scalar_op_impl!(Div, div, $v, $($e),*);
        scalar_assign_op_impl!(MulAssign, mul_assign, $v, $($e),*);
        scalar_assign_op_impl!(DivAssign, div_assign, $v, $($e),*);
    }
}

vec_impl!(Vec2f, 2, x, y);
vec_impl!(Vec3f, 3, x, y, z);
vec_impl!(Vec4f, 4, x, y, z, w);

impl Vec3f {
    /// Right-handed cross product.
    #[inline]
    pub fn cross(self, rhs: Vec3f) -> Vec3f {
        Vec3f {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    /// Lift to homogeneous coordinates with the given `w`.
    #[inline]
    pub fn extend(self, w: f32) -> Vec4f {
        Vec4f::new(self.x, self.y, self.z, w)
    }
}

impl Vec4f {
    /// Drop `w` without dividing.
    #[inline]
    pub fn truncate(self) -> Vec3f {
        Vec3f::new(self.x, self.y, self.z)
    }

    /// Perspective divide: x/y/z over w.
    #[inline]
    pub fn perspective_divide(self) -> Vec3f {
        (self / self.w).truncate()
    }
}

impl ops::Index<usize> for Vec4f {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("Vec4f index out of range: {i}"),
        }
    }
}

impl ops::IndexMut<usize> for Vec4f {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            3 => &mut self.w,
            _ => panic!("Vec4f index out of range: {i}"),
        }
    }
}

/// Flat `f32` view over a slice of vectors, in component order.
pub fn as_floats<V: Pod>(items: &[V]) -> &[f32] {
    bytemuck::cast_slice(items)
}
