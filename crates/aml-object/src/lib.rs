//! AML Object Model - Core Library
//!
//! Runtime values of the AML interpreter: variables, shared payloads, and the
//! create / resize / clone / convert operations the executor runs on them.

pub mod config;
pub mod error;
pub mod host;
pub mod name;
pub mod object;

// Re-export commonly used types
pub use config::ObjectConfig;
pub use error::{AmlError, AmlResult};
pub use host::{Allocator, Diagnostics, Namespace, NodeHandle, NodeKind};
pub use name::{AmlName, NameSeg};
pub use object::{ObjectContext, ObjectType, Variable};

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::{Cell, RefCell};
	use std::fmt;
	use std::rc::Rc;

	/// Resolves names by their rendered text; enough to exercise handle paths.
	struct FixedNamespace {
		names: Vec<(&'static str, NodeHandle)>,
		kinds: Vec<(NodeHandle, NodeKind)>,
	}

	impl Namespace for FixedNamespace {
		fn resolve(&self, _context: NodeHandle, name: &AmlName) -> Option<NodeHandle> {
			let text = name.to_string();
			self.names.iter().find(|(n, _)| *n == text).map(|(_, h)| *h)
		}

		fn node_kind(&self, node: NodeHandle) -> Option<NodeKind> {
			self.kinds.iter().find(|(h, _)| *h == node).map(|(_, k)| *k)
		}
	}

	#[derive(Default)]
	struct RecordingDiagnostics {
		warnings: RefCell<Vec<String>>,
	}

	impl Diagnostics for RecordingDiagnostics {
		fn warn(&self, args: fmt::Arguments<'_>) {
			self.warnings.borrow_mut().push(args.to_string());
		}

		fn fatal(&self, args: fmt::Arguments<'_>) -> ! {
			panic!("fatal: {}", args);
		}
	}

	/// Admits `left` allocations, then refuses everything.
	/// Admits the next `left` requests, tracking bytes still outstanding
	struct CountdownAllocator {
		left: Cell<usize>,
		in_use: Cell<usize>,
	}

	impl Allocator for CountdownAllocator {
		fn allocate(&self, size: usize) -> bool {
			let left = self.left.get();
			if left == 0 {
				return false;
			}
			self.left.set(left - 1);
			self.in_use.set(self.in_use.get() + size);
			true
		}

		fn free(&self, size: usize) {
			self.in_use.set(self.in_use.get() - size);
		}
	}

	fn namespace() -> Rc<FixedNamespace> {
		Rc::new(FixedNamespace {
			names: vec![("\\_SB.PCI0", NodeHandle(2)), ("\\_SB.MEM0", NodeHandle(3))],
			kinds: vec![
				(NodeHandle(1), NodeKind::Scope),
				(NodeHandle(2), NodeKind::Device),
				(NodeHandle(3), NodeKind::Name),
			],
		})
	}

	fn context() -> (ObjectContext, Rc<RecordingDiagnostics>) {
		let diagnostics = Rc::new(RecordingDiagnostics::default());
		let ctx = ObjectContext::new(ObjectConfig::new(), namespace())
			.with_diagnostics(diagnostics.clone());
		(ctx, diagnostics)
	}

	fn context_with_allocations(n: usize) -> (ObjectContext, Rc<CountdownAllocator>) {
		let allocator = Rc::new(CountdownAllocator {
			left: Cell::new(n),
			in_use: Cell::new(0),
		});
		let ctx = ObjectContext::new(ObjectConfig::new(), namespace()).with_allocator(allocator.clone());
		(ctx, allocator)
	}

	#[test]
	fn create_buffer_is_zero_filled() {
		let (ctx, _) = context();
		let buf = ctx.create_buffer(5).expect("create failed");
		assert_eq!(buf.buffer_bytes(), Ok(vec![0; 5]));
		assert_eq!(buf.ref_count(), Some(1));
	}

	#[test]
	fn create_c_string_stops_at_nul() {
		let (ctx, _) = context();
		let s = ctx.create_c_string(b"_HID\0junk").expect("create failed");
		assert_eq!(s.string_len(), Ok(4));
		assert_eq!(s.string_bytes(), Ok(b"_HID".to_vec()));
		match &s {
			Variable::String(p) => assert_eq!(p.borrow().capacity(), 4),
			other => panic!("unexpected variable: {:?}", other),
		}
	}

	#[test]
	fn create_pkg_has_empty_slots() {
		let (ctx, _) = context();
		let pkg = ctx.create_pkg(3).expect("create failed");
		assert_eq!(pkg.pkg_size(), Ok(3));
		for i in 0..3 {
			assert!(ctx.get_pkg(&pkg, i).expect("get failed").is_none());
		}
	}

	#[test]
	fn create_reports_out_of_memory_on_either_allocation() {
		// header refused
		let (ctx, _) = context_with_allocations(0);
		assert_eq!(ctx.create_buffer(4), Err(AmlError::OutOfMemory));
		// content refused
		let (ctx, _) = context_with_allocations(1);
		assert_eq!(ctx.create_string(4), Err(AmlError::OutOfMemory));
		let (ctx, _) = context_with_allocations(1);
		assert_eq!(ctx.create_pkg(4), Err(AmlError::OutOfMemory));
	}

	#[test]
	fn refused_content_returns_the_header_charge() {
		let (ctx, allocator) = context_with_allocations(1);
		assert_eq!(ctx.create_buffer(64), Err(AmlError::OutOfMemory));
		assert_eq!(allocator.in_use.get(), 0);

		let (ctx, allocator) = context_with_allocations(1);
		assert_eq!(ctx.create_c_string(b"_UID"), Err(AmlError::OutOfMemory));
		assert_eq!(allocator.in_use.get(), 0);
	}

	#[test]
	fn dropping_the_last_reference_returns_every_charge() {
		let (ctx, allocator) = context_with_allocations(16);
		let pkg = ctx.create_pkg(2).expect("create failed");
		let buf = ctx.create_buffer(32).expect("create failed");
		ctx.pkg_store(&pkg, 0, &buf).expect("store failed");
		let copy = ctx.deep_clone(&pkg).expect("clone failed");
		assert!(allocator.in_use.get() > 0);

		drop(buf);
		drop(copy);
		drop(pkg);
		assert_eq!(allocator.in_use.get(), 0);
	}

	#[test]
	fn growth_returns_the_old_content_charge() {
		let (ctx, allocator) = context_with_allocations(8);
		let buf = ctx.create_buffer(4).expect("create failed");
		let header = match &buf {
			Variable::Buffer(p) => p.borrow().charged() - 4,
			other => panic!("unexpected variable: {:?}", other),
		};
		ctx.resize_buffer(&buf, 16).expect("resize failed");
		assert_eq!(allocator.in_use.get(), header + 16);
		// shrinking keeps the existing content
		ctx.resize_buffer(&buf, 2).expect("resize failed");
		assert_eq!(allocator.in_use.get(), header + 16);
	}

	#[test]
	fn oversized_request_is_refused_before_the_allocator() {
		let mut config = ObjectConfig::new();
		config.max_allocation = 64;
		let ctx = ObjectContext::new(config, namespace());
		assert!(ctx.create_buffer(64).is_ok());
		assert_eq!(ctx.create_buffer(65), Err(AmlError::OutOfMemory));
		assert_eq!(ctx.create_string(usize::MAX), Err(AmlError::OutOfMemory));
	}

	#[test]
	fn resize_buffer_preserves_prefix() {
		let (ctx, _) = context();
		let buf = ctx.create_buffer(3).expect("create failed");
		buf.with_buffer_mut(|b| b.copy_from_slice(&[1, 2, 3])).expect("write failed");

		ctx.resize_buffer(&buf, 6).expect("grow failed");
		assert_eq!(buf.buffer_bytes(), Ok(vec![1, 2, 3, 0, 0, 0]));

		ctx.resize_buffer(&buf, 2).expect("shrink failed");
		assert_eq!(buf.buffer_bytes(), Ok(vec![1, 2]));
	}

	#[test]
	fn resize_is_visible_through_shared_copies() {
		let (ctx, _) = context();
		let buf = ctx.create_buffer(1).expect("create failed");
		let alias = buf.clone();
		ctx.resize_buffer(&buf, 4).expect("grow failed");
		assert_eq!(alias.buffer_size(), Ok(4));
	}

	#[test]
	fn resize_string_only_grows_storage() {
		let (ctx, _) = context();
		let s = ctx.create_c_string(b"abc").expect("create failed");

		ctx.resize_string(&s, 8).expect("grow failed");
		assert_eq!(s.string_bytes(), Ok(b"abc".to_vec()));
		match &s {
			Variable::String(p) => assert_eq!(p.borrow().capacity(), 8),
			other => panic!("unexpected variable: {:?}", other),
		}

		ctx.resize_string(&s, 1).expect("shrink failed");
		match &s {
			Variable::String(p) => assert_eq!(p.borrow().capacity(), 8),
			other => panic!("unexpected variable: {:?}", other),
		}
	}

	#[test]
	fn resize_rejects_wrong_kind() {
		let (ctx, _) = context();
		let int = Variable::Integer(1);
		assert_eq!(ctx.resize_string(&int, 1), Err(AmlError::TypeMismatch));
		assert_eq!(ctx.resize_buffer(&int, 1), Err(AmlError::TypeMismatch));
		assert_eq!(ctx.resize_pkg(&int, 1), Err(AmlError::TypeMismatch));
	}

	#[test]
	fn resize_pkg_keeps_elements_by_identity() {
		let (ctx, _) = context();
		let pkg = ctx.create_pkg(3).expect("create failed");
		let buf = ctx.create_buffer(2).expect("create failed");
		ctx.pkg_store(&pkg, 0, &buf).expect("store failed");
		ctx.pkg_store(&pkg, 2, &ctx.create_buffer(1).expect("create failed"))
			.expect("store failed");
		assert_eq!(buf.ref_count(), Some(2));

		ctx.resize_pkg(&pkg, 5).expect("grow failed");
		assert_eq!(pkg.pkg_size(), Ok(5));
		let first = ctx.get_pkg(&pkg, 0).expect("get failed");
		assert!(first.shares_payload_with(&buf));
		// growth moves, so only `buf`, the package slot and `first` hold it
		assert_eq!(buf.ref_count(), Some(3));
		assert!(ctx.get_pkg(&pkg, 4).expect("get failed").is_none());
		drop(first);

		ctx.resize_pkg(&pkg, 1).expect("shrink failed");
		assert_eq!(pkg.pkg_size(), Ok(1));
		assert_eq!(ctx.get_pkg(&pkg, 1), Err(AmlError::OutOfBounds));
		assert!(ctx.get_pkg(&pkg, 0).expect("get failed").shares_payload_with(&buf));
	}

	#[test]
	fn failed_package_growth_leaves_package_intact() {
		let (ctx, _) = context_with_allocations(2);
		let pkg = ctx.create_pkg(2).expect("create failed");
		ctx.pkg_store(&pkg, 1, &Variable::Integer(9)).expect("store failed");
		assert_eq!(ctx.resize_pkg(&pkg, 4), Err(AmlError::OutOfMemory));
		assert_eq!(pkg.pkg_size(), Ok(2));
		assert_eq!(ctx.get_pkg(&pkg, 1), Ok(Variable::Integer(9)));
	}

	#[test]
	fn failed_buffer_growth_leaves_buffer_intact() {
		let (ctx, allocator) = context_with_allocations(2);
		let buf = ctx.create_buffer(3).expect("create failed");
		buf.with_buffer_mut(|b| b.copy_from_slice(&[1, 2, 3])).expect("write failed");
		let charged = allocator.in_use.get();

		assert_eq!(ctx.resize_buffer(&buf, 8), Err(AmlError::OutOfMemory));
		assert_eq!(buf.buffer_size(), Ok(3));
		assert_eq!(buf.buffer_bytes(), Ok(vec![1, 2, 3]));
		assert_eq!(allocator.in_use.get(), charged);
	}

	#[test]
	fn failed_string_growth_leaves_string_intact() {
		let (ctx, allocator) = context_with_allocations(2);
		let s = ctx.create_c_string(b"PNP0A03").expect("create failed");
		let charged = allocator.in_use.get();

		assert_eq!(ctx.resize_string(&s, 32), Err(AmlError::OutOfMemory));
		assert_eq!(s.string_len(), Ok(7));
		assert_eq!(s.string_bytes(), Ok(b"PNP0A03".to_vec()));
		match &s {
			Variable::String(p) => assert_eq!(p.borrow().capacity(), 7),
			other => panic!("unexpected variable: {:?}", other),
		}
		assert_eq!(allocator.in_use.get(), charged);
	}

	#[test]
	fn get_integer_warns_on_mismatch() {
		let (ctx, diagnostics) = context();
		assert_eq!(ctx.get_integer(&Variable::Integer(42)), Ok(42));
		assert_eq!(ctx.get_integer(&Variable::None), Err(AmlError::TypeMismatch));
		let warnings = diagnostics.warnings.borrow();
		assert_eq!(warnings.len(), 1);
		assert!(warnings[0].contains("none"));
	}

	#[test]
	fn get_pkg_checks_kind_and_bounds() {
		let (ctx, _) = context();
		let pkg = ctx.create_pkg(2).expect("create failed");
		assert_eq!(ctx.get_pkg(&Variable::Integer(0), 0), Err(AmlError::TypeMismatch));
		assert_eq!(ctx.get_pkg(&pkg, 2), Err(AmlError::OutOfBounds));
		assert_eq!(ctx.get_pkg(&pkg, 7), Err(AmlError::OutOfBounds));
		assert_eq!(ctx.pkg_store(&pkg, 2, &Variable::None), Err(AmlError::OutOfBounds));
	}

	#[test]
	fn to_buffer_converts_integers_and_strings() {
		let (ctx, _) = context();
		let buf = ctx.to_buffer(&Variable::Integer(0x1122_3344_5566_7788)).expect("convert failed");
		assert_eq!(buf.buffer_bytes(), Ok(0x1122_3344_5566_7788u64.to_le_bytes().to_vec()));

		let empty = ctx.create_c_string(b"").expect("create failed");
		assert_eq!(ctx.to_buffer(&empty).expect("convert failed").buffer_size(), Ok(0));

		let s = ctx.create_c_string(b"PNP").expect("create failed");
		let buf = ctx.to_buffer(&s).expect("convert failed");
		assert_eq!(buf.buffer_bytes(), Ok(b"PNP\0".to_vec()));
	}

	#[test]
	fn to_buffer_copies_buffers() {
		let (ctx, _) = context();
		let src = ctx.create_buffer(2).expect("create failed");
		let out = ctx.to_buffer(&src).expect("convert failed");
		assert!(!out.shares_payload_with(&src));
		assert_eq!(out, src);
	}

	#[test]
	fn to_buffer_rejects_other_kinds() {
		let (ctx, diagnostics) = context();
		assert_eq!(ctx.to_buffer(&Variable::Handle(NodeHandle(2))), Err(AmlError::IllegalArguments));
		let pkg = ctx.create_pkg(1).expect("create failed");
		assert_eq!(ctx.to_buffer(&pkg), Err(AmlError::IllegalArguments));
		assert_eq!(diagnostics.warnings.borrow().len(), 2);
	}

	#[test]
	fn cloned_package_is_independent() {
		let (ctx, _) = context();
		let pkg = ctx.create_pkg(2).expect("create failed");
		ctx.pkg_store(&pkg, 0, &Variable::Integer(5)).expect("store failed");
		let buf = ctx.create_buffer(3).expect("create failed");
		buf.with_buffer_mut(|b| b.copy_from_slice(&[1, 2, 3])).expect("write failed");
		ctx.pkg_store(&pkg, 1, &buf).expect("store failed");

		let mut copy = Variable::None;
		ctx.clone_into(&mut copy, &pkg).expect("clone failed");
		ctx.get_pkg(&copy, 1)
			.expect("get failed")
			.with_buffer_mut(|b| b[0] = 9)
			.expect("write failed");

		assert_eq!(buf.buffer_bytes(), Ok(vec![1, 2, 3]));
		assert_eq!(ctx.get_pkg(&copy, 1).expect("get failed").buffer_bytes(), Ok(vec![9, 2, 3]));
		assert_eq!(ctx.get_pkg(&copy, 0), Ok(Variable::Integer(5)));
	}

	#[test]
	fn clone_over_a_shared_payload() {
		let (ctx, _) = context();
		let src = ctx.create_c_string(b"ABC").expect("create failed");
		let mut dest = src.clone();
		ctx.clone_into(&mut dest, &src).expect("clone failed");
		assert!(!dest.shares_payload_with(&src));
		assert_eq!(src.ref_count(), Some(1));
		assert_eq!(dest.string_bytes(), Ok(b"ABC".to_vec()));
	}

	#[test]
	fn self_clone_keeps_content_and_detaches_aliases() {
		let (ctx, _) = context();
		let mut v = ctx.create_buffer(2).expect("create failed");
		v.with_buffer_mut(|b| b.copy_from_slice(&[7, 8])).expect("write failed");
		let alias = v.clone();

		ctx.clone_in_place(&mut v).expect("clone failed");
		assert_eq!(v, alias);
		assert!(!v.shares_payload_with(&alias));
		assert_eq!(alias.ref_count(), Some(1));
	}

	#[test]
	fn clone_of_scalars_is_shallow() {
		let (ctx, _) = context();
		let mut dest = ctx.create_buffer(4).expect("create failed");
		ctx.clone_into(&mut dest, &Variable::Integer(3)).expect("clone failed");
		assert_eq!(dest, Variable::Integer(3));

		let lazy = Variable::lazy_handle(b"PCI0", NodeHandle(1));
		ctx.clone_into(&mut dest, &lazy).expect("clone failed");
		assert_eq!(dest, lazy);
	}

	#[test]
	fn failed_clone_leaves_destination_untouched() {
		let (ctx, allocator) = context_with_allocations(6);
		let pkg = ctx.create_pkg(2).expect("create failed");
		let buf = ctx.create_buffer(1).expect("create failed");
		ctx.pkg_store(&pkg, 0, &buf).expect("store failed");
		let charged = allocator.in_use.get();

		// the copy's package fits, its buffer does not
		let mut dest = Variable::Integer(11);
		assert_eq!(ctx.clone_into(&mut dest, &pkg), Err(AmlError::OutOfMemory));
		assert_eq!(dest, Variable::Integer(11));
		assert_eq!(buf.ref_count(), Some(2));
		assert_eq!(allocator.in_use.get(), charged);
	}

	#[test]
	fn handle_types_come_from_the_namespace() {
		let (ctx, _) = context();
		assert_eq!(ctx.get_type(&Variable::None), ObjectType::None);
		assert_eq!(ctx.get_type(&Variable::Integer(0)), ObjectType::Integer);
		assert_eq!(ctx.get_type(&Variable::Handle(NodeHandle(2))), ObjectType::Device);

		let lazy = Variable::lazy_handle(b"\\\x2E_SB_PCI0", NodeHandle(1));
		assert_eq!(ctx.get_type(&lazy), ObjectType::Device);
		assert_eq!(ctx.get_handle(&lazy), Ok(NodeHandle(2)));
	}

	#[test]
	fn get_handle_rejects_values() {
		let (ctx, diagnostics) = context();
		assert_eq!(ctx.get_handle(&Variable::Integer(1)), Err(AmlError::TypeMismatch));
		assert_eq!(diagnostics.warnings.borrow().len(), 1);
	}

	#[test]
	#[should_panic(expected = "undefined reference \\_SB.GPE0")]
	fn undefined_lazy_reference_is_fatal() {
		let (ctx, _) = context();
		let lazy = Variable::lazy_handle(b"\\\x2E_SB_GPE0", NodeHandle(1));
		ctx.get_type(&lazy);
	}

	#[test]
	#[should_panic(expected = "unexpected node type")]
	fn non_device_node_is_fatal() {
		let (ctx, _) = context();
		ctx.get_type(&Variable::Handle(NodeHandle(3)));
	}
}
