//! Type erasure over the supported array element types.
//!
//! The structure owns arrays of ten primitive scalar types. [`AnyStore`] is
//! the sum type holding one [`DataStore<T>`] per element type; the sealed
//! [`Scalar`] trait carries the [`DType`] discriminant and the
//! injection/projection used by the typed lookup API
//! (`DataStructure::data_as::<T>`).

use crate::data::store::DataStore;
use crate::error::DataGroveError;

mod sealed {
    pub trait Sealed {}
}

/// Element-type discriminant for arrays and stores.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl DType {
    /// Size of one element in bytes.
    pub const fn size_of(self) -> usize {
        match self {
            DType::I8 | DType::U8 => 1,
            DType::I16 | DType::U16 => 2,
            DType::I32 | DType::U32 | DType::F32 => 4,
            DType::I64 | DType::U64 | DType::F64 => 8,
        }
    }
}

/// Marker for types storable in a [`DataStore`].
///
/// Sealed: exactly the ten primitive numeric types below implement it. The
/// `Pod` bound gives the byte views, `Zero` the value-initialization on
/// resize.
pub trait Scalar:
    bytemuck::Pod + num_traits::Zero + PartialOrd + std::fmt::Debug + Send + Sync + sealed::Sealed
{
    /// Discriminant matching this element type.
    const DTYPE: DType;

    /// Project a typed store out of an [`AnyStore`], if the types agree.
    fn store_ref(any: &AnyStore) -> Option<&DataStore<Self>>;
    /// Mutable projection.
    fn store_mut(any: &mut AnyStore) -> Option<&mut DataStore<Self>>;
    /// Wrap a typed store into the erased sum.
    fn into_any(store: DataStore<Self>) -> AnyStore;
}

/// A [`DataStore`] of any supported element type.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AnyStore {
    I8(DataStore<i8>),
    U8(DataStore<u8>),
    I16(DataStore<i16>),
    U16(DataStore<u16>),
    I32(DataStore<i32>),
    U32(DataStore<u32>),
    I64(DataStore<i64>),
    U64(DataStore<u64>),
    F32(DataStore<f32>),
    F64(DataStore<f64>),
}

/// Dispatch a body over whichever typed store an [`AnyStore`] holds.
macro_rules! for_each_store {
    ($any:expr, $store:ident => $body:expr) => {
        match $any {
            AnyStore::I8($store) => $body,
            AnyStore::U8($store) => $body,
            AnyStore::I16($store) => $body,
            AnyStore::U16($store) => $body,
            AnyStore::I32($store) => $body,
            AnyStore::U32($store) => $body,
            AnyStore::I64($store) => $body,
            AnyStore::U64($store) => $body,
            AnyStore::F32($store) => $body,
            AnyStore::F64($store) => $body,
        }
    };
}

impl AnyStore {
    /// Construct a zero-filled store of the given element type and shapes.
    pub fn new(dtype: DType, tuple_shape: Vec<usize>, component_shape: Vec<usize>) -> Self {
        match dtype {
            DType::I8 => AnyStore::I8(DataStore::new(tuple_shape, component_shape)),
            DType::U8 => AnyStore::U8(DataStore::new(tuple_shape, component_shape)),
            DType::I16 => AnyStore::I16(DataStore::new(tuple_shape, component_shape)),
            DType::U16 => AnyStore::U16(DataStore::new(tuple_shape, component_shape)),
            DType::I32 => AnyStore::I32(DataStore::new(tuple_shape, component_shape)),
            DType::U32 => AnyStore::U32(DataStore::new(tuple_shape, component_shape)),
            DType::I64 => AnyStore::I64(DataStore::new(tuple_shape, component_shape)),
            DType::U64 => AnyStore::U64(DataStore::new(tuple_shape, component_shape)),
            DType::F32 => AnyStore::F32(DataStore::new(tuple_shape, component_shape)),
            DType::F64 => AnyStore::F64(DataStore::new(tuple_shape, component_shape)),
        }
    }

    /// Element type held by this store.
    pub fn dtype(&self) -> DType {
        for_each_store!(self, s => s.dtype())
    }

    /// Number of tuples.
    pub fn tuple_count(&self) -> usize {
        for_each_store!(self, s => s.tuple_count())
    }

    /// Components per tuple.
    pub fn component_count(&self) -> usize {
        for_each_store!(self, s => s.component_count())
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        for_each_store!(self, s => s.len())
    }

    /// Whether the store holds no elements.
    pub fn is_empty(&self) -> bool {
        for_each_store!(self, s => s.is_empty())
    }

    /// Ordered tuple dimensions.
    pub fn tuple_shape(&self) -> &[usize] {
        for_each_store!(self, s => s.tuple_shape())
    }

    /// Per-tuple component dimensions.
    pub fn component_shape(&self) -> &[usize] {
        for_each_store!(self, s => s.component_shape())
    }

    /// Resize to `new_tuple_count` tuples; overlap preserved, growth zeroed.
    pub fn resize_tuples(&mut self, new_tuple_count: usize) {
        for_each_store!(self, s => s.resize_tuples(new_tuple_count))
    }

    /// Replace the tuple shape; flat tuple overlap preserved.
    pub fn reshape_tuples(&mut self, new_tuple_shape: Vec<usize>) {
        for_each_store!(self, s => s.reshape_tuples(new_tuple_shape))
    }

    /// Copy a full tuple within the store.
    pub fn copy_tuple(&mut self, src: usize, dst: usize) -> Result<(), DataGroveError> {
        for_each_store!(self, s => s.copy_tuple(src, dst))
    }

    /// Raw byte view of the backing buffer.
    pub fn as_bytes(&self) -> &[u8] {
        for_each_store!(self, s => s.as_bytes())
    }

    /// Typed projection; `None` when the element types disagree.
    #[inline]
    pub fn typed<T: Scalar>(&self) -> Option<&DataStore<T>> {
        T::store_ref(self)
    }

    /// Mutable typed projection.
    #[inline]
    pub fn typed_mut<T: Scalar>(&mut self) -> Option<&mut DataStore<T>> {
        T::store_mut(self)
    }

    /// Typed projection that reports the found type on mismatch.
    pub fn typed_ref<T: Scalar>(&self) -> Result<&DataStore<T>, DataGroveError> {
        let found = self.dtype();
        self.typed::<T>()
            .ok_or(DataGroveError::UnexpectedElementType {
                expected: T::DTYPE,
                found,
            })
    }
}

impl<T: Scalar> From<DataStore<T>> for AnyStore {
    fn from(store: DataStore<T>) -> Self {
        T::into_any(store)
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl sealed::Sealed for $ty {}
        impl Scalar for $ty {
            const DTYPE: DType = DType::$variant;

            fn store_ref(any: &AnyStore) -> Option<&DataStore<Self>> {
                match any {
                    AnyStore::$variant(s) => Some(s),
                    _ => None,
                }
            }

            fn store_mut(any: &mut AnyStore) -> Option<&mut DataStore<Self>> {
                match any {
                    AnyStore::$variant(s) => Some(s),
                    _ => None,
                }
            }

            fn into_any(store: DataStore<Self>) -> AnyStore {
                AnyStore::$variant(store)
            }
        }
    )*};
}

impl_scalar! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}
