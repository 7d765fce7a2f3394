//! Declarative packet schemas.

/// Declare a packet schema.
///
/// Generates the struct plus [`Readable`], [`Writable`], [`Packet`] and
/// [`PacketSchema`] implementations that walk the fields in declaration
/// order. Field order is the wire format: there is no field-name framing.
///
/// Every field type must implement [`Readable`] and [`Writable`]. Wrap a
/// field in [`Json`](crate::types::Json) to carry it as a JSON document.
///
/// ```
/// use tuff_mc::types::VarInt;
///
/// tuff_mc::packet! {
///     /// Keep alive.
///     pub struct KeepAlive as "keep_alive" {
///         pub id: VarInt,
///     }
/// }
/// ```
///
/// [`Readable`]: crate::packets::traits::Readable
/// [`Writable`]: crate::packets::traits::Writable
/// [`Packet`]: crate::packets::traits::Packet
/// [`PacketSchema`]: crate::packets::traits::PacketSchema
#[macro_export]
macro_rules! packet {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident as $schema:literal {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::packets::traits::Readable for $name {
            #[allow(unused_variables)]
            fn read(buf: &mut impl $crate::__private::Buf) -> $crate::Result<Self> {
                Ok(Self {
                    $(
                        $field: $crate::packets::traits::read_field::<$ty>(
                            buf,
                            <Self as $crate::packets::traits::PacketSchema>::SCHEMA,
                            stringify!($field),
                        )?,
                    )*
                })
            }
        }

        impl $crate::packets::traits::Writable for $name {
            #[allow(unused_variables)]
            fn write(&self, buf: &mut impl $crate::__private::BufMut) -> $crate::Result<()> {
                $(
                    $crate::packets::traits::Writable::write(&self.$field, buf)?;
                )*
                Ok(())
            }
        }

        impl $crate::packets::traits::Packet for $name {
            fn schema(&self) -> $crate::packets::traits::SchemaId {
                <Self as $crate::packets::traits::PacketSchema>::SCHEMA
            }

            fn write_fields(&self, buf: &mut $crate::__private::BytesMut) -> $crate::Result<()> {
                $crate::packets::traits::Writable::write(self, buf)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl $crate::packets::traits::PacketSchema for $name {
            const SCHEMA: $crate::packets::traits::SchemaId =
                $crate::packets::traits::SchemaId($schema);
        }
    };
}
