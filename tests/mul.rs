use mxgraph::*;

#[test]
fn dense_mul() {
    let n = 4;
    let a = MX::symbol("a",n,n);
    let v = MX::symbol("v",n,1);
    let r = a.mtimes(&v).unwrap();
    assert!(r.is_multiplication());
    assert_eq!(r.shape(),Shape(n,1));
    assert!(r.is_dense());

    let r = v.transpose().unwrap().mtimes(&a).unwrap();
    assert_eq!(r.shape(),Shape(1,n));
    assert!(matches!(v.mtimes(&a),Err(Error::ShapeMismatch{..})));
}

#[test]
fn sparse_mul() {
    let n = 5;
    // Lower bidiagonal
    let (sp,_) = Sparsity::from_triplets(n,n,&(0..n).map(|i| (i,i)).chain((1..n).map(|i| (i,i-1))).collect::<Vec<_>>()).unwrap();
    let l = MX::symbol_with_sparsity("l",sp.clone());
    let r = l.mtimes(&l).unwrap();
    // Lower tridiagonal band
    assert_eq!(r.nnz(),3*n-3);
    assert!(r.sparsity().unwrap().entries().all(|(i,j)| j <= i && i-j <= 2));

    let r = l.mtimes(&l.transpose().unwrap()).unwrap();
    assert_eq!(r.nnz(),3*n-2);

    let r = l.mtimes(&MX::eye(n)).unwrap();
    assert_eq!(r.sparsity().unwrap(),&sp);
}

#[test]
fn zero_and_scalar_operands() {
    let a = MX::symbol("a",3,2);
    let r = a.mtimes(&MX::sparse(2,4)).unwrap();
    assert!(r.is_zero());
    assert_eq!(r.shape(),Shape(3,4));

    let r = MX::zeros(5,3).mtimes(&a).unwrap();
    assert!(r.is_zero());
    assert_eq!(r.shape(),Shape(5,2));

    assert!(MX::same_node(&a.mtimes(&MX::scalar(1.0)).unwrap(),&a));
    assert_eq!(a.mtimes(&MX::symbol("s",1,1)).unwrap().op(),Some(Op::Mul));
}

#[test]
fn products_of_vectors() {
    let x = MX::symbol("x",4,1);
    let y = MX::symbol("y",4,1);
    let r = x.inner_prod(&y).unwrap();
    assert!(r.is_scalar());
    assert!(r.dep(0).unwrap().is_mapping());

    let r = x.outer_prod(&y).unwrap();
    assert_eq!(r.shape(),Shape(4,4));
    assert!(r.is_dense());

    assert!(matches!(x.inner_prod(&MX::symbol("z",1,4)),Err(Error::ShapeMismatch{..})));
}

#[test]
fn transpose_of_sparse() {
    let (sp,_) = Sparsity::from_triplets(2,3,&[(0,2),(1,0),(1,1)]).unwrap();
    let c = MX::constant(sp,vec![1.0,2.0,3.0]).unwrap();
    let t = c.transpose().unwrap();
    assert_eq!(t.shape(),Shape(3,2));
    assert_eq!(t.sparsity().unwrap().entries().collect::<Vec<_>>(),&[(0,1),(1,1),(2,0)]);
    assert_eq!(t.constant_values().unwrap(),&[2.0,3.0,1.0]);
}
