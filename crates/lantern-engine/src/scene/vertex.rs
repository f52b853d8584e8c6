use crate::gl::ScalarKind;

/// Value of one vertex attribute.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AttributeValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    IVec2([i32; 2]),
    IVec3([i32; 3]),
    IVec4([i32; 4]),
}

impl AttributeValue {
    pub fn components(&self) -> usize {
        match self {
            AttributeValue::Float(_) | AttributeValue::Int(_) => 1,
            AttributeValue::Vec2(_) | AttributeValue::IVec2(_) => 2,
            AttributeValue::Vec3(_) | AttributeValue::IVec3(_) => 3,
            AttributeValue::Vec4(_) | AttributeValue::IVec4(_) => 4,
        }
    }

    pub fn kind(&self) -> ScalarKind {
        match self {
            AttributeValue::Float(_)
            | AttributeValue::Vec2(_)
            | AttributeValue::Vec3(_)
            | AttributeValue::Vec4(_) => ScalarKind::Float,
            _ => ScalarKind::Int,
        }
    }

    /// Short GLSL-style name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Float(_) => "float",
            AttributeValue::Vec2(_) => "vec2",
            AttributeValue::Vec3(_) => "vec3",
            AttributeValue::Vec4(_) => "vec4",
            AttributeValue::Int(_) => "int",
            AttributeValue::IVec2(_) => "ivec2",
            AttributeValue::IVec3(_) => "ivec3",
            AttributeValue::IVec4(_) => "ivec4",
        }
    }

    /// Appends the value's native-endian bytes to `out`.
    pub(crate) fn write_bytes(&self, out: &mut Vec<u8>) {
        match self {
            AttributeValue::Float(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            AttributeValue::Vec2(v) => out.extend_from_slice(bytemuck::cast_slice(v)),
            AttributeValue::Vec3(v) => out.extend_from_slice(bytemuck::cast_slice(v)),
            AttributeValue::Vec4(v) => out.extend_from_slice(bytemuck::cast_slice(v)),
            AttributeValue::Int(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            AttributeValue::IVec2(v) => out.extend_from_slice(bytemuck::cast_slice(v)),
            AttributeValue::IVec3(v) => out.extend_from_slice(bytemuck::cast_slice(v)),
            AttributeValue::IVec4(v) => out.extend_from_slice(bytemuck::cast_slice(v)),
        }
    }
}

impl From<f32> for AttributeValue {
    fn from(v: f32) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<[f32; 2]> for AttributeValue {
    fn from(v: [f32; 2]) -> Self {
        AttributeValue::Vec2(v)
    }
}

impl From<[f32; 3]> for AttributeValue {
    fn from(v: [f32; 3]) -> Self {
        AttributeValue::Vec3(v)
    }
}

impl From<[f32; 4]> for AttributeValue {
    fn from(v: [f32; 4]) -> Self {
        AttributeValue::Vec4(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<[i32; 2]> for AttributeValue {
    fn from(v: [i32; 2]) -> Self {
        AttributeValue::IVec2(v)
    }
}

impl From<[i32; 3]> for AttributeValue {
    fn from(v: [i32; 3]) -> Self {
        AttributeValue::IVec3(v)
    }
}

impl From<[i32; 4]> for AttributeValue {
    fn from(v: [i32; 4]) -> Self {
        AttributeValue::IVec4(v)
    }
}

/// One vertex record: attribute name → value.
///
/// Field order is insertion order; setting an existing name replaces its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vertex {
    fields: Vec<(String, AttributeValue)>,
}

impl Vertex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_existing_field() {
        let v = Vertex::new()
            .with("position", [0.0f32, 1.0, 2.0])
            .with("weight", 0.5f32)
            .with("position", [3.0f32, 4.0, 5.0]);
        assert_eq!(v.get("position"), Some(&AttributeValue::Vec3([3.0, 4.0, 5.0])));
        assert_eq!(v.iter().count(), 2);
    }

    #[test]
    fn layout_of_values() {
        assert_eq!(AttributeValue::from([1i32, 2]).components(), 2);
        assert_eq!(AttributeValue::from([1i32, 2]).kind(), ScalarKind::Int);
        assert_eq!(AttributeValue::from(1.0f32).kind(), ScalarKind::Float);
    }

    #[test]
    fn bytes_are_tightly_packed() {
        let mut out = Vec::new();
        AttributeValue::Vec2([1.0, 2.0]).write_bytes(&mut out);
        AttributeValue::Int(7).write_bytes(&mut out);
        assert_eq!(out.len(), 12);
        assert_eq!(&out[8..], bytemuck::bytes_of(&7i32));
    }
}
