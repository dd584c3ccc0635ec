//! Hand-written descriptors shared by registry tests.

use std::any::{Any, TypeId};

use serde_json::Map;

use crate::{BaseType, CreatorDef, Polymorphic, SupertypeDef, TypeDef};

pub(crate) trait Animal: Polymorphic {}
crate::base_type!(Animal, namespace = "org::pkg::animal");

pub(crate) trait Person: Polymorphic {}
crate::base_type!(Person, namespace = "org::pkg::person");

pub(crate) trait Shape: Polymorphic {}
crate::base_type!(Shape, namespace = "org::pkg::shape");

macro_rules! fixture_type {
	(
		$static:ident: $ty:ident,
		name = $name:literal,
		namespace = $namespace:literal,
		qualified = $qualified:literal,
		extends = [$($base:ident),*]
	) => {
		pub(crate) struct $ty;

		$(impl $base for $ty {})*

		impl Polymorphic for $ty {
			fn type_def(&self) -> &'static TypeDef {
				&$static
			}

			fn as_any(&self) -> &dyn Any {
				self
			}
		}

		pub(crate) static $static: TypeDef = TypeDef {
			name: $name,
			namespace: $namespace,
			qualified: $qualified,
			type_id: || TypeId::of::<$ty>(),
			supertypes: &[$(SupertypeDef {
				base: <dyn $base as BaseType>::base_def,
				upcast: |value| {
					let concrete = value.downcast::<$ty>()?;
					let erased: Box<dyn $base> = concrete;
					Ok(Box::new(erased))
				},
			}),*],
			creators: &[CreatorDef {
				params: Some(&[]),
				arity: 0,
				create: |_| Ok(Box::new($ty)),
			}],
			properties: |value| value.downcast_ref::<$ty>().map(|_| Ok(Map::new())),
		};
	};
}

fixture_type!(CAT: Cat,
	name = "Cat",
	namespace = "org::pkg::animal",
	qualified = "org::pkg::animal::Cat",
	extends = [Animal]
);

fixture_type!(DOG: Dog,
	name = "Dog",
	namespace = "org::pkg::animal",
	qualified = "org::pkg::animal::Dog",
	extends = [Animal]
);

fixture_type!(WILD_CAT: WildCat,
	name = "Cat",
	namespace = "org::pkg::wild",
	qualified = "org::pkg::wild::Cat",
	extends = [Animal]
);

fixture_type!(EMPLOYEE: Employee,
	name = "Employee",
	namespace = "org::pkg::person",
	qualified = "org::pkg::person::Employee",
	extends = [Person]
);

fixture_type!(LOST_EMPLOYEE: LostEmployee,
	name = "LostEmployee",
	namespace = "",
	qualified = "LostEmployee",
	extends = [Person]
);

fixture_type!(CIRCLE: Circle,
	name = "Circle",
	namespace = "org::pkg::shape",
	qualified = "org::pkg::shape::Circle",
	extends = [Shape]
);

fixture_type!(CENTAUR: Centaur,
	name = "Centaur",
	namespace = "org::pkg::myth",
	qualified = "org::pkg::myth::Centaur",
	extends = [Animal, Person]
);

pub(crate) fn animal() -> &'static crate::BaseDef {
	<dyn Animal as BaseType>::base_def()
}

pub(crate) fn person() -> &'static crate::BaseDef {
	<dyn Person as BaseType>::base_def()
}

pub(crate) fn shape() -> &'static crate::BaseDef {
	<dyn Shape as BaseType>::base_def()
}

/// Every fixture descriptor.
pub(crate) fn all() -> [&'static TypeDef; 7] {
	[
		&CAT,
		&DOG,
		&WILD_CAT,
		&EMPLOYEE,
		&LOST_EMPLOYEE,
		&CIRCLE,
		&CENTAUR,
	]
}
